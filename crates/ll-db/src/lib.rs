pub mod assignment_repo;
pub mod communication_repo;
pub mod event_repo;
pub mod profile_repo;
pub mod request_repo;
pub mod schema;
pub mod session_repo;
pub mod store;
pub mod util;

pub use crate::store::DbStore;

#[cfg(test)]
pub(crate) mod fixtures {
    use ll_core::profiles::ProfileRepository;
    use ll_core::types::{NewProfile, Profile, Role};
    use rusqlite::Connection;

    pub fn profile(conn: &Connection, name: &str, role: Role) -> Profile {
        crate::profile_repo::ProfileRepo::new(conn)
            .create(NewProfile {
                full_name: name.to_string(),
                email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
                phone: Some("+8801711000000".to_string()),
                role,
                latitude: Some(23.81),
                longitude: Some(90.41),
                password_hash: "$argon2id$unused".to_string(),
            })
            .unwrap()
    }
}
