use indexmap::IndexMap;

/// Mapping from a declared port name to its 1-based port number, input and
/// output sides kept independently.
///
/// Port names are optional: a gate built with an empty name list simply has
/// positional ports and every lookup returns [None].
///
/// # Example
/// ```
/// # use gatesim::gate::PortNames;
/// let names = PortNames::new(&["j", "k"]);
/// assert_eq!(names.get("j"), Some(1));
/// assert_eq!(names.get("k"), Some(2));
/// assert_eq!(names.get("q"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortNames {
    map: IndexMap<String, usize>,
}

impl PortNames {
    /// Builds the mapping in declaration order, first name is port 1.
    pub fn new(names: &[&str]) -> PortNames {
        PortNames {
            map: names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.to_string(), i + 1))
                .collect(),
        }
    }

    /// Returns the 1-based port number declared under `name`.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.map.get(name).copied()
    }

    /// Returns the number of declared names.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no port names were declared.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_based_in_declaration_order() {
        let names = PortNames::new(&["a", "b", "cin"]);
        assert_eq!(names.get("a"), Some(1));
        assert_eq!(names.get("b"), Some(2));
        assert_eq!(names.get("cin"), Some(3));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_absent_name_is_none() {
        let names = PortNames::new(&["d"]);
        assert_eq!(names.get("q"), None);

        let unnamed = PortNames::default();
        assert!(unnamed.is_empty());
        assert_eq!(unnamed.get("d"), None);
    }
}
