// metadata.json as written by the first version of the blog backend
#[cfg(test)]
pub const LEGACY_METADATA: &str = r#"{
  "author_name": "John Doe",
  "author_username": "johndoe",
  "created": "2022-04-02T12:05:00+02:00",
  "id": "a63bd715-a3fe-4788-b0e1-2a3153778544",
  "meta_description": "Read about What I learned after 20+ years of software development",
  "meta_name": "What I learned after 20+ years of software development",
  "published": true,
  "slug": "what-i-learned",
  "title": "What I learned after 20+ years of software development",
  "updated": "2022-04-03 08:00:00"
}"#;

#[cfg(test)]
pub const LEGACY_CONTENT: &str = "How to be a great software engineer?

Someone asked me this question today and I didn’t have an answer. After thinking for a while, I came up with a list of what I try to do myself.

## Non technical

### Have a honest image of yourself

You finished university and learned a lot. You solved many hard problems.
";
