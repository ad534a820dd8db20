use crate::params::{Body, Cookie, Header, Param, Parameters, Query, Responses};

/// Declarations inherited by every operation registered later in the same
/// scope or in a nested group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    pub query: Query,
    pub header: Header,
    pub cookie: Cookie,
    pub body: Body,
    pub responses: Responses,
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, name: impl Into<String>, param: Param) -> Self {
        self.query.insert(name.into(), param);
        self
    }

    pub fn header(mut self, name: impl Into<String>, param: Param) -> Self {
        self.header.insert(name.into(), param);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, param: Param) -> Self {
        self.cookie.insert(name.into(), param);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn responses(mut self, responses: Responses) -> Self {
        self.responses = responses;
        self
    }

    /// Merge a later overlay into this one; the overlay wins field by field
    pub fn merge(&mut self, overlay: &Defaults) {
        for (name, param) in &overlay.query {
            self.query.insert(name.clone(), param.clone());
        }
        for (name, param) in &overlay.header {
            self.header.insert(name.clone(), param.clone());
        }
        for (name, param) in &overlay.cookie {
            self.cookie.insert(name.clone(), param.clone());
        }
        self.body.overlay(&overlay.body);
        self.responses.merge(&overlay.responses);
    }

    /// Combine an operation's own declarations with these defaults. The
    /// operation's values take precedence.
    pub fn apply(&self, parameters: &Parameters, responses: &Responses) -> (Parameters, Responses) {
        let mut merged = Parameters {
            path: parameters.path.clone(),
            query: self.query.clone(),
            header: self.header.clone(),
            cookie: self.cookie.clone(),
            body: self.body.clone(),
        };
        for (name, param) in &parameters.query {
            merged.query.insert(name.clone(), param.clone());
        }
        for (name, param) in &parameters.header {
            merged.header.insert(name.clone(), param.clone());
        }
        for (name, param) in &parameters.cookie {
            merged.cookie.insert(name.clone(), param.clone());
        }
        merged.body.overlay(&parameters.body);

        let mut merged_responses = self.responses.clone();
        merged_responses.merge(responses);

        (merged, merged_responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleValue;
    use http::StatusCode;

    #[test]
    fn test_default_query_is_inherited() {
        let defaults = Defaults::new().query("q", Param::optional(&"default"));
        let (params, _) = defaults.apply(&Parameters::new(), &Responses::new());

        assert_eq!(params.query.len(), 1);
        assert!(params.query["q"].optional);
    }

    #[test]
    fn test_operation_param_overrides_default() {
        let defaults = Defaults::new().query("q", Param::optional(&"default"));
        let own = Parameters::new().query("q", Param::new(&42));
        let (params, _) = defaults.apply(&own, &Responses::new());

        assert!(!params.query["q"].optional);
        assert_eq!(params.query["q"].value, SampleValue::of(&42));
    }

    #[test]
    fn test_header_and_cookie_merge_independently() {
        let defaults = Defaults::new()
            .header("X-Trace", Param::optional(&"t"))
            .cookie("session", Param::new(&"s"));
        let (params, _) = defaults.apply(&Parameters::new(), &Responses::new());

        assert_eq!(params.header.keys().collect::<Vec<_>>(), vec!["X-Trace"]);
        assert_eq!(params.cookie.keys().collect::<Vec<_>>(), vec!["session"]);
    }

    #[test]
    fn test_merge_overlay_wins() {
        let mut base = Defaults::new()
            .query("a", Param::new(&1))
            .responses(Responses::new().with(StatusCode::INTERNAL_SERVER_ERROR, &"oops"));
        base.merge(
            &Defaults::new()
                .query("a", Param::optional(&2))
                .query("b", Param::new(&3))
                .responses(Responses::new().with(StatusCode::UNAUTHORIZED, &"denied")),
        );

        assert!(base.query["a"].optional);
        assert_eq!(base.query.len(), 2);
        assert_eq!(base.responses.len(), 2);
    }

    #[test]
    fn test_responses_entry_wins() {
        let defaults =
            Defaults::new().responses(Responses::new().with(StatusCode::OK, &"default"));
        let own = Responses::new().with(StatusCode::OK, &1);
        let (_, responses) = defaults.apply(&Parameters::new(), &own);

        assert_eq!(responses.len(), 1);
        assert_eq!(
            responses.get(StatusCode::OK).and_then(|c| c.get("application/json")),
            Some(&SampleValue::of(&1))
        );
    }
}
