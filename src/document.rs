use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

use linked_hash_map::LinkedHashMap;

/// A set of properties, each holding the values it was assigned
/// in the order they were seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    properties: LinkedHashMap<String, Vec<String>>,
}

impl Section {
    /// Create an empty section.
    pub fn new() -> Section {
        Section::default()
    }

    pub(crate) fn add_property(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        if let Some(values) = self.properties.get_mut(&property) {
            values.push(value);
        } else {
            self.properties.insert(property, vec![value]);
        }
    }

    /// Names of all properties that have been set at least once.
    pub fn properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.keys().map(|p| p.as_str())
    }

    /// All values set for `property`. Empty if it was never set.
    ///
    /// A property that was set once to an empty value yields `[""]`.
    pub fn values(&self, property: &str) -> &[String] {
        self.properties
            .get(property)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Was `property` set at least once.
    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// The values of `property` joined by a single space, for numeric
    /// interpretation by the caller. `None` if it was never set.
    pub fn number(&self, property: &str) -> Option<Number> {
        self.properties.get(property).map(|v| Number(v.join(" ")))
    }

    /// Properties and their values, in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.properties
            .iter()
            .map(|(p, v)| (p.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Section
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut section = Section::new();
        for (property, value) in iter {
            section.add_property(property, value);
        }
        section
    }
}

/// Raw text of a numeric-looking property. No parsing has been done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(String);

impl Number {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the text, e.g. `n.parse::<i64>()`.
    pub fn parse<T: FromStr>(&self) -> Result<T, T::Err> {
        self.0.parse()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed configuration.
///
/// Holds the global section (properties that appear before the first
/// `[section]` header) and the named sections in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub(crate) global: Section,
    pub(crate) sections: LinkedHashMap<String, Section>,
}

impl Config {
    /// Properties that appear before any section header.
    pub fn global_section(&self) -> &Section {
        &self.global
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Section names in the order they were declared.
    pub fn section_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.keys().map(|n| n.as_str())
    }

    /// Named sections in the order they were declared.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> + '_ {
        self.sections.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_order() {
        let section: Section = vec![("key", "a"), ("other", "x"), ("key", "b")]
            .into_iter()
            .collect();
        assert_eq!(section.values("key"), ["a", "b"]);
        assert_eq!(section.properties().collect::<Vec<_>>(), ["key", "other"]);
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn absent_versus_empty() {
        let section: Section = vec![("empty", "")].into_iter().collect();
        assert!(section.values("missing").is_empty());
        assert!(!section.contains("missing"));
        assert_eq!(section.values("empty"), [""]);
        assert!(section.contains("empty"));
    }

    #[test]
    fn number_joins_values() {
        let section: Section = vec![("n", "1"), ("msg", "hello"), ("msg", "world")]
            .into_iter()
            .collect();
        let n = section.number("n").unwrap();
        assert_eq!(n.parse::<i64>(), Ok(1));
        assert_eq!(section.number("msg").unwrap().as_str(), "hello world");
        assert!(section.number("msg").unwrap().parse::<i64>().is_err());
        assert_eq!(section.number("missing"), None);
    }
}
