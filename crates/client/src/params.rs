//! Addressing parameters in the remote bundle.

use serde::Serialize;

/// Selects parameters by twig, unique id, or individual tags.
///
/// Unset fields are left out of the request. A plain string converts to a
/// twig filter.
///
/// ```
/// use phoebe_client::ParamFilter;
///
/// let by_twig = ParamFilter::from("period@binary");
/// let by_tags = ParamFilter::new().qualifier("period").component("binary");
/// # let _ = (by_twig, by_tags);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uniqueid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ParamFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn twig(mut self, twig: impl Into<String>) -> Self {
        self.twig = Some(twig.into());
        self
    }

    pub fn uniqueid(mut self, uniqueid: impl Into<String>) -> Self {
        self.uniqueid = Some(uniqueid.into());
        self
    }

    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

impl From<&str> for ParamFilter {
    fn from(twig: &str) -> Self {
        Self::new().twig(twig)
    }
}

impl From<String> for ParamFilter {
    fn from(twig: String) -> Self {
        Self::new().twig(twig)
    }
}

/// Body of a `set_value` command.
#[derive(Serialize)]
pub(crate) struct SetValue<'a, V: Serialize + ?Sized> {
    #[serde(flatten)]
    pub filter: &'a ParamFilter,
    pub value: &'a V,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_fields_are_omitted() {
        let filter = ParamFilter::new().qualifier("period").component("binary");
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"qualifier": "period", "component": "binary"})
        );
    }

    #[test]
    fn string_is_twig() {
        assert_eq!(
            ParamFilter::from("teff@primary"),
            ParamFilter::new().twig("teff@primary")
        );
    }

    #[test]
    fn set_value_flattens_filter() {
        let filter = ParamFilter::from("period@binary");
        let body = SetValue {
            filter: &filter,
            value: &1.5,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"twig": "period@binary", "value": 1.5})
        );
    }
}
