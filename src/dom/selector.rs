use std::fmt;

/// One attribute condition of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    Present(String),
    Equals(String, String),
    Contains(String, String),
}

/// A compound selector: optional tag, classes and attribute conditions that
/// must all hold on the same element (`input[role='combobox']`, `.ant-select`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
}

impl Compound {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Self::any().with_class(class)
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str) -> Self {
        self.attrs.push(AttrMatch::Present(name.to_ascii_lowercase()));
        self
    }

    pub fn attr_eq(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .push(AttrMatch::Equals(name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// `[name*='value']`: the attribute contains `value` as a substring.
    pub fn attr_contains(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .push(AttrMatch::Contains(name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Test the compound against an element given its lowercase tag name and
    /// an attribute lookup.
    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(expected) = &self.tag {
            if expected != tag {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = attr("class").unwrap_or("");
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }

        self.attrs.iter().all(|cond| match cond {
            AttrMatch::Present(name) => attr(name).is_some(),
            AttrMatch::Equals(name, value) => attr(name) == Some(value.as_str()),
            AttrMatch::Contains(name, value) => attr(name).is_some_and(|v| v.contains(value.as_str())),
        })
    }
}

/// Escape text for a single-quoted CSS string. Control characters become
/// hex escapes; NUL becomes U+FFFD as in `CSS.escape`.
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\\' | '\'' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\{:x} ", c as u32)),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}", tag)?,
            None if self.classes.is_empty() && self.attrs.is_empty() => write!(f, "*")?,
            None => {}
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        for cond in &self.attrs {
            match cond {
                AttrMatch::Present(name) => write!(f, "[{}]", name)?,
                AttrMatch::Equals(name, value) => write!(f, "[{}='{}']", name, css_string(value))?,
                AttrMatch::Contains(name, value) => write!(f, "[{}*='{}']", name, css_string(value))?,
            }
        }
        Ok(())
    }
}

/// A selector group: an element matches when any compound matches.
///
/// Renders to CSS via `Display`, which is what the browser backend sends to
/// the page; the in-memory document evaluates it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector(Vec<Compound>);

impl Selector {
    pub fn any_of(compounds: impl IntoIterator<Item = Compound>) -> Self {
        Selector(compounds.into_iter().collect())
    }

    /// Convenience for a group of plain class markers.
    pub fn classes(classes: &[&str]) -> Self {
        Selector::any_of(classes.iter().map(|c| Compound::class(c)))
    }

    pub fn tag(tag: &str) -> Self {
        Selector(vec![Compound::tag(tag)])
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.0
    }

    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str> + Copy) -> bool {
        self.0.iter().any(|c| c.matches(tag, attr))
    }
}

impl From<Compound> for Selector {
    fn from(compound: Compound) -> Self {
        Selector(vec![compound])
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}
