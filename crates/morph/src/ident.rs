//! Identifier generation: UUID variants, GUID and ULID

use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use uuid::Uuid;

const CROCKFORD: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Generate one fresh identifier of every supported kind
///
/// The v3 and v5 name-based UUIDs hash the freshly generated v4 under
/// the DNS namespace so each call still yields distinct values.
pub fn generate_ids() -> IndexMap<String, String> {
    let v4 = Uuid::new_v4();
    let name = v4.to_string();
    let node = node_id();
    let mut out = IndexMap::new();
    out.insert("uuid_v1".to_string(), Uuid::now_v1(&node).to_string());
    out.insert(
        "uuid_v3".to_string(),
        Uuid::new_v3(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string(),
    );
    out.insert("uuid_v4".to_string(), name.clone());
    out.insert(
        "uuid_v5".to_string(),
        Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string(),
    );
    out.insert("uuid_v6".to_string(), Uuid::now_v6(&node).to_string());
    out.insert("uuid_v7".to_string(), Uuid::now_v7().to_string());
    out.insert(
        "guid".to_string(),
        format!("{{{}}}", v4.to_string().to_ascii_uppercase()),
    );
    out.insert("ulid".to_string(), ulid());
    out
}

/// Random 6-byte node for the timestamp-based UUID versions
fn node_id() -> [u8; 6] {
    let [b0, b1, b2, b3, b4, b5, ..] = Uuid::new_v4().into_bytes();
    [b0, b1, b2, b3, b4, b5]
}

/// 26-character Crockford base32 ULID: 48-bit ms timestamp plus 80
/// random bits
fn ulid() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = u128::try_from(millis).unwrap_or(0) & ((1 << 48) - 1);
    let random_bytes = Uuid::new_v4().into_bytes();
    let mut randomness: u128 = 0;
    for byte in random_bytes.iter().take(10) {
        randomness = (randomness << 8) | u128::from(*byte);
    }
    let value = (timestamp << 80) | randomness;
    let mut out = String::with_capacity(26);
    for i in (0..26).rev() {
        let index = usize::try_from((value >> (i * 5)) & 0x1f).unwrap_or(0);
        out.push(char::from(*CROCKFORD.get(index).unwrap_or(&b'0')));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_present() {
        let ids = generate_ids();
        for kind in [
            "uuid_v1", "uuid_v3", "uuid_v4", "uuid_v5", "uuid_v6", "uuid_v7", "guid", "ulid",
        ] {
            assert!(ids.contains_key(kind), "missing {kind}");
        }
    }

    #[test]
    fn test_uuid_versions() {
        let ids = generate_ids();
        for (kind, version) in [
            ("uuid_v1", 1),
            ("uuid_v3", 3),
            ("uuid_v4", 4),
            ("uuid_v5", 5),
            ("uuid_v6", 6),
            ("uuid_v7", 7),
        ] {
            let parsed: Uuid = ids[kind].parse().unwrap();
            assert_eq!(parsed.get_version_num(), version, "wrong version for {kind}");
        }
    }

    #[test]
    fn test_guid_shape() {
        let ids = generate_ids();
        let guid = &ids["guid"];
        assert!(guid.starts_with('{') && guid.ends_with('}'));
        assert_eq!(guid.len(), 38);
        assert!(!guid.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_ulid_shape() {
        let ids = generate_ids();
        let ulid = &ids["ulid"];
        assert_eq!(ulid.len(), 26);
        assert!(ulid.bytes().all(|b| CROCKFORD.contains(&b)));
    }

    #[test]
    fn test_calls_are_distinct() {
        let a = generate_ids();
        let b = generate_ids();
        assert_ne!(a["uuid_v4"], b["uuid_v4"]);
        assert_ne!(a["ulid"], b["ulid"]);
    }
}
