use crate::post_store::AuthorDefaults;

/// Author of posts created from the command line: the OS account running it.
/// Falls back to the login name when no real name is set.
pub fn os_author() -> AuthorDefaults {
    let username = whoami::username();
    let name = whoami::realname();
    let name = if name.trim().is_empty() { username.clone() } else { name };

    AuthorDefaults { name, username }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_author() {
        let author = os_author();
        assert_eq!(author.username, whoami::username());
        if !author.username.is_empty() {
            assert!(!author.name.is_empty());
        }
    }
}
