/// The page URL's fragment, without the leading `#`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    fragment: String,
}

impl Location {
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// `#fragment`, or empty when there is none.
    pub fn hash(&self) -> String {
        if self.fragment.is_empty() {
            String::new()
        } else {
            format!("#{}", self.fragment)
        }
    }

    /// Assigns without notifying anyone; returns whether the value changed.
    pub(crate) fn set_fragment(&mut self, fragment: &str) -> bool {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if self.fragment == fragment {
            return false;
        }
        self.fragment = fragment.to_string();
        true
    }
}
