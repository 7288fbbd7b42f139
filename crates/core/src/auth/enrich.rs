use super::Session;
use crate::identity::User;

/// Copy locally stored profile fields onto a session.
///
/// With a matching user the session gains the stringified user id and the
/// first and last name (empty when no last name is stored). Without one the
/// session is returned as is.
pub fn enrich_session(mut session: Session, user: Option<&User>) -> Session {
    if let Some(user) = user {
        session.user.id = Some(user.id.to_string());
        session.user.first_name = Some(user.first_name.clone());
        session.user.last_name = Some(user.last_name.clone().unwrap_or_default());
    }

    session
}
