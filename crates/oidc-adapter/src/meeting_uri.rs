//! Final meeting redirect target.

/// Compose `https://{host}/{path}/{room}?jwt={token}#{hash}`.
///
/// `path` is the raw tenant path from the client state, forwarded as-is
/// (it is not the resolved token subject). Runs of `/` in the path part
/// are collapsed to one, so an absent path leaves no empty segment.
pub fn assemble(host: &str, path: Option<&str>, room: &str, token: &str, hash: &str) -> String {
    let raw_path = format!("/{}/{}", path.unwrap_or(""), room);
    format!(
        "https://{}{}?jwt={}#{}",
        host,
        collapse_separators(&raw_path),
        token,
        hash
    )
}

fn collapse_separators(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }

    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_with_tenant() {
        assert_eq!(
            assemble("meet.example.com", Some("tenant1"), "room1", "TOKEN", "adapter=true"),
            "https://meet.example.com/tenant1/room1?jwt=TOKEN#adapter=true"
        );
    }

    #[test]
    fn test_assemble_without_tenant() {
        assert_eq!(
            assemble("meet.example.com", None, "room1", "TOKEN", "adapter=true"),
            "https://meet.example.com/room1?jwt=TOKEN#adapter=true"
        );
        assert_eq!(
            assemble("meet.example.com", Some(""), "room1", "TOKEN", "adapter=true"),
            "https://meet.example.com/room1?jwt=TOKEN#adapter=true"
        );
    }

    #[test]
    fn test_assemble_collapses_repeated_separators() {
        assert_eq!(
            assemble("meet.example.com", Some("//a//b/"), "room1", "T", "adapter=true"),
            "https://meet.example.com/a/b/room1?jwt=T#adapter=true"
        );
    }

    #[test]
    fn test_assemble_keeps_hash_verbatim() {
        let hash = "adapter=true&config.foo=%22bar%22";
        let uri = assemble("h", Some("t"), "r", "T", hash);
        assert!(uri.ends_with("#adapter=true&config.foo=%22bar%22"));
    }

    #[test]
    fn test_collapse_separators() {
        assert_eq!(collapse_separators("///a////b//"), "/a/b/");
        assert_eq!(collapse_separators("/a/b"), "/a/b");
    }
}
