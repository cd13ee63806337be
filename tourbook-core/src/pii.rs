use std::fmt;

/// Wraps customer contact data for log output.
///
/// Emails keep the first character of the local part and the domain
/// (`a***@example.com`); anything else keeps only its last two characters.
pub struct Masked<'a>(pub &'a str);

impl fmt::Display for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let first = local.chars().next().map(String::from).unwrap_or_default();
                write!(f, "{}***@{}", first, domain)
            }
            None => {
                let chars: Vec<char> = self.0.chars().collect();
                let keep = chars.len().saturating_sub(2);
                let tail: String = chars[keep..].iter().collect();
                write!(f, "***{}", tail)
            }
        }
    }
}

impl fmt::Debug for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
