//! ETag helpers for snapshot caching.

/// Strong ETag for a room snapshot, derived from the room id and its lock
/// version. Any mutation bumps the version, so the pair identifies a
/// snapshot revision exactly.
pub fn room_etag(room_id: i64, lock_version: i32) -> String {
    format!("\"room-{room_id}-v{lock_version}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_changes_with_version() {
        let a = room_etag(1, 1);
        let b = room_etag(1, 2);
        assert_ne!(a, b);
        assert!(a.starts_with('"') && a.ends_with('"'));
    }
}
