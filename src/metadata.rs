include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));

/// Value sent to the backend as `User-Agent`.
pub fn user_agent() -> String {
    format!("{PKG_NAME}/{PKG_VERSION}")
}
