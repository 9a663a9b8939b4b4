//! Content negotiation for the tour routes.
//!
//! - [`registry`] -- The variant table and its registration-time checks.
//! - [`matcher`] -- Exact media-type matching with default fallback.
//!
//! [`tour_registry`] builds the table the router serves from.

pub mod matcher;
pub mod registry;

use axum::http::Method;
use tourline_core::creation::CreationShape;
use tourline_core::policy::Policy;
use tourline_core::representation::RepresentationShape;

pub use registry::{
    NegotiationHeader, NoMatch, RegistryError, RepresentationRegistry, TourOperation, Variant,
};

pub const TOUR: &str = "application/vnd.marvin.tour+json";
pub const TOUR_WITH_ESTIMATED_PROFITS: &str =
    "application/vnd.marvin.tourwithestimatedprofits+json";
pub const TOUR_WITH_SHOWS: &str = "application/vnd.marvin.tourwithshows+json";
pub const TOUR_WITH_ESTIMATED_PROFITS_AND_SHOWS: &str =
    "application/vnd.marvin.tourwithestimatedprofitsandshows+json";

pub const TOUR_FOR_CREATION: &str = "application/vnd.marvin.tourforcreation+json";
pub const TOUR_WITH_MANAGER_FOR_CREATION: &str =
    "application/vnd.marvin.tourwithmanagerforcreation+json";
pub const TOUR_WITH_SHOWS_FOR_CREATION: &str =
    "application/vnd.marvin.tourwithshowsforcreation+json";
pub const TOUR_WITH_MANAGER_AND_SHOWS_FOR_CREATION: &str =
    "application/vnd.marvin.tourwithmanagerandshowsforcreation+json";

/// Registry key of the tour collection route.
pub const TOURS_PATH: &str = "/tours";
/// Registry key of the single-tour route.
pub const TOUR_PATH: &str = "/tours/{id}";

/// Variant table for the tour resource.
pub fn tour_registry() -> Result<RepresentationRegistry, RegistryError> {
    use NegotiationHeader::{Accept, ContentType};
    use Policy::{AdministratorRole, OwnerMatch};
    use TourOperation::{Create, List, PartialUpdate, Read};

    let mut builder = RepresentationRegistry::builder();

    builder.register(Method::GET, TOURS_PATH, Accept, Variant::new("list", List))?;

    builder
        .register(
            Method::GET,
            TOUR_PATH,
            Accept,
            Variant::new("read", Read(RepresentationShape::FLAT)),
        )?
        .register(
            Method::GET,
            TOUR_PATH,
            Accept,
            Variant::new("read-flat", Read(RepresentationShape::FLAT))
                .media_type(TOUR)
                .require(OwnerMatch),
        )?
        .register(
            Method::GET,
            TOUR_PATH,
            Accept,
            Variant::new(
                "read-with-estimated-profits",
                Read(RepresentationShape::WITH_ESTIMATED_PROFITS),
            )
            .media_type(TOUR_WITH_ESTIMATED_PROFITS)
            .require(OwnerMatch)
            .require(AdministratorRole),
        )?
        .register(
            Method::GET,
            TOUR_PATH,
            Accept,
            Variant::new("read-with-shows", Read(RepresentationShape::WITH_SHOWS))
                .media_type(TOUR_WITH_SHOWS)
                .require(OwnerMatch),
        )?
        .register(
            Method::GET,
            TOUR_PATH,
            Accept,
            Variant::new(
                "read-with-estimated-profits-and-shows",
                Read(RepresentationShape::WITH_ESTIMATED_PROFITS_AND_SHOWS),
            )
            .media_type(TOUR_WITH_ESTIMATED_PROFITS_AND_SHOWS)
            .require(OwnerMatch)
            .require(AdministratorRole),
        )?;

    builder
        .register(
            Method::POST,
            TOURS_PATH,
            ContentType,
            Variant::new("create", Create(CreationShape::FLAT)),
        )?
        .register(
            Method::POST,
            TOURS_PATH,
            ContentType,
            Variant::new("create-flat", Create(CreationShape::FLAT)).media_type(TOUR_FOR_CREATION),
        )?
        .register(
            Method::POST,
            TOURS_PATH,
            ContentType,
            Variant::new("create-with-manager", Create(CreationShape::WITH_MANAGER))
                .media_type(TOUR_WITH_MANAGER_FOR_CREATION)
                .require(AdministratorRole),
        )?
        .register(
            Method::POST,
            TOURS_PATH,
            ContentType,
            Variant::new("create-with-shows", Create(CreationShape::WITH_SHOWS))
                .media_type(TOUR_WITH_SHOWS_FOR_CREATION),
        )?
        .register(
            Method::POST,
            TOURS_PATH,
            ContentType,
            Variant::new(
                "create-with-manager-and-shows",
                Create(CreationShape::WITH_MANAGER_AND_SHOWS),
            )
            .media_type(TOUR_WITH_MANAGER_AND_SHOWS_FOR_CREATION)
            .require(AdministratorRole),
        )?;

    builder.register(
        Method::PATCH,
        TOUR_PATH,
        ContentType,
        Variant::new("partially-update", PartialUpdate).require(OwnerMatch),
    )?;

    Ok(builder.build())
}
