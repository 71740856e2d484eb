use super::error::RouteError;
use smallvec::SmallVec;
use std::sync::Arc;

/// Most routes carry a handful of parameters; up to this many stay inline.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated `(name, value)` storage for path and query parameters.
///
/// Names are `Arc<str>` so the router can hand out the names of a compiled
/// route without copying them per request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Source of single parameter values, shared by the query and path binders.
pub trait ParamSource {
    /// Raw value of `key`, `None` when absent
    fn value(&self, key: &str) -> Option<&str>;

    /// Parse a required value.
    ///
    /// Absent yields [`RouteError::MissingRequiredParameter`]; present but
    /// rejected by `parse` yields [`RouteError::UnparsableParameter`].
    fn required<T, F>(&self, key: &str, parse: F) -> Result<T, RouteError>
    where
        F: Fn(&str) -> Option<T>,
    {
        let raw = self
            .value(key)
            .ok_or_else(|| RouteError::MissingRequiredParameter(key.to_string()))?;
        parse(raw).ok_or_else(|| RouteError::UnparsableParameter(key.to_string()))
    }

    /// Parse an optional value; absent yields `Ok(None)`.
    fn optional<T, F>(&self, key: &str, parse: F) -> Result<Option<T>, RouteError>
    where
        F: Fn(&str) -> Option<T>,
    {
        match self.value(key) {
            None => Ok(None),
            Some(raw) => parse(raw)
                .map(Some)
                .ok_or_else(|| RouteError::UnparsableParameter(key.to_string())),
        }
    }
}

/// Query string multimap in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: ParamVec,
}

impl QueryParams {
    /// Parse a raw (still percent-encoded) query string
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let params = url::form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect();
        Self { params }
    }

    /// First value of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `key` in request order
    pub fn get_all<'s>(&'s self, key: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.params
            .iter()
            .filter(move |(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse every value of `key`; absent yields an empty list and the first
    /// value rejected by `parse` fails the whole list.
    pub fn list<T, F>(&self, key: &str, parse: F) -> Result<Vec<T>, RouteError>
    where
        F: Fn(&str) -> Option<T>,
    {
        self.get_all(key)
            .map(|raw| parse(raw).ok_or_else(|| RouteError::UnparsableParameter(key.to_string())))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl ParamSource for QueryParams {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (Arc::from(k.as_ref()), v.into()))
                .collect(),
        }
    }
}

/// Values extracted from URL placeholders.
///
/// An empty value counts as absent. Duplicate names resolve to the last
/// occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: ParamVec,
}

impl PathParams {
    #[must_use]
    pub fn new(params: ParamVec) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }
}

impl ParamSource for PathParams {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (Arc::from(k.as_ref()), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::parse;

    #[test]
    fn test_query_decoding_and_order() {
        let q = QueryParams::parse("name=a%20b&tag=x&tag=y&empty=");
        assert_eq!(q.get("name"), Some("a b"));
        assert_eq!(q.get_all("tag").collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(q.get("empty"), Some(""));
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn test_required() {
        let q = QueryParams::parse("count=3&bad=x");
        assert_eq!(q.required("count", parse::int32).unwrap(), 3);
        assert!(matches!(
            q.required("missing", parse::int32),
            Err(RouteError::MissingRequiredParameter(ref k)) if k == "missing"
        ));
        assert!(matches!(
            q.required("bad", parse::int32),
            Err(RouteError::UnparsableParameter(ref k)) if k == "bad"
        ));
    }

    #[test]
    fn test_optional() {
        let q = QueryParams::parse("flag=T");
        assert_eq!(q.optional("flag", parse::boolean).unwrap(), Some(true));
        assert_eq!(q.optional("other", parse::boolean).unwrap(), None);
    }

    #[test]
    fn test_list_stops_at_first_bad_element() {
        let q = QueryParams::parse("n=1&n=x&n=3");
        assert!(matches!(
            q.list("n", parse::int64),
            Err(RouteError::UnparsableParameter(_))
        ));
        assert_eq!(q.list("absent", parse::int64).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_empty_path_value_is_absent() {
        let p: PathParams = [("id", ""), ("slug", "a")].into_iter().collect();
        assert!(matches!(
            p.required("id", parse::string),
            Err(RouteError::MissingRequiredParameter(_))
        ));
        assert_eq!(p.required("slug", parse::string).unwrap(), "a");
    }

    #[test]
    fn test_path_last_write_wins() {
        let p: PathParams = [("id", "org"), ("id", "user")].into_iter().collect();
        assert_eq!(p.get("id"), Some("user"));
    }
}
