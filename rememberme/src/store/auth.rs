//! Sign-in helpers shared by the store implementations

use super::errors::{StoreError, StoreResult};
use super::traits::FamilyStore;
use crate::session::Session;

/// Translate an auth service message into what the user should see
pub fn friendly_auth_message(raw: &str) -> String {
    if raw.contains("Invalid login credentials") {
        "Invalid email or password".to_string()
    } else if raw.contains("Email not confirmed") {
        "Please verify your email address".to_string()
    } else {
        raw.to_string()
    }
}

/// Build the session for a signed-in auth user
///
/// Users that own a family member record act for that member's patient; every
/// other user is treated as a patient whose id is the user id.
pub async fn session_for_user<S>(
    store: &S,
    user_id: &str,
    email: &str,
    access_token: Option<String>,
) -> StoreResult<Session>
where
    S: FamilyStore + ?Sized,
{
    let session = match store.get_family_member_by_user(user_id).await? {
        Some(member) => {
            if member.patient_id.is_empty() {
                return Err(StoreError::Other(format!(
                    "Family member {} is not linked to a patient",
                    member.id
                )));
            }
            Session::family_member(user_id, member.id, member.patient_id)
        }
        None => Session::patient(user_id),
    };

    let session = session.with_email(email);
    Ok(match access_token {
        Some(token) => session.with_access_token(token),
        None => session,
    })
}
