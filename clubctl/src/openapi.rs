//! OpenAPI document for the management API.
//!
//! Only the externally interesting operations are annotated; the plain CRUD
//! endpoints follow the same conventions and are documented in the README.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "clubctl",
        description = "Control layer for sports-class academies: classes, waitlists, leagues, and payments."
    ),
    paths(
        crate::api::handlers::classes::bulk_create_classes,
        crate::api::handlers::classes::enroll_participant,
        crate::api::handlers::waitlist::join_waitlist,
        crate::api::handlers::waitlist::notify_next,
        crate::api::handlers::leagues::record_match,
        crate::api::handlers::leagues::get_standings,
        crate::api::handlers::payments::create_checkout,
        crate::api::handlers::payments::process_payment,
    ),
    components(schemas(
        crate::api::models::classes::BulkClassCreate,
        crate::api::models::classes::EnrollRequest,
        crate::api::models::waitlist::JoinWaitlistRequest,
        crate::api::models::leagues::MatchCreate,
        crate::api::models::leagues::StandingsEntry,
        crate::api::models::payments::CheckoutRequest,
        crate::api::models::payments::CheckoutResponse,
        crate::standings::StandingsRow,
        crate::waitlist::notifier::NotifyOutcome,
        crate::db::models::classes::ProgrammedClass,
        crate::db::models::participants::ClassParticipant,
        crate::db::models::waitlist::WaitlistEntry,
        crate::db::models::leagues::LeagueMatch,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "classes", description = "Class scheduling and enrollment"),
        (name = "waitlist", description = "Waitlist and spot offers"),
        (name = "leagues", description = "Leagues, matches, standings"),
        (name = "payments", description = "Enrollment payments"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
