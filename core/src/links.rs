//! Operations on bitlinks: expand, info, lookup, shorten, clicks, popular.
//!
//! # Design
//! `Links` borrows a `Client` and adds nothing but parameter assembly and
//! payload decoding. Each operation comes as a `build_*`/`parse_*` pair for
//! callers that run their own I/O, plus a method that does the round trip
//! through the client's transport.
//!
//! Expand, info and lookup return `{"<key>": [Link, ...]}`; the others
//! return their structure directly in `data`.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Client;
use crate::error::BitlyError;
use crate::http::{HttpRequest, HttpResponse, QueryParams, Transport};
use crate::types::{Link, PopularLinks, TimeUnit, Units};

const EXPAND: &str = "/expand";
const INFO: &str = "/info";
const LOOKUP: &str = "/link/lookup";
const SHORTEN: &str = "/shorten";
const CLICKS: &str = "/link/clicks";
const POPULAR: &str = "/user/popular_links";

pub struct Links<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T> Links<'a, T> {
    pub fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn build_expand<I, S>(&self, short_urls: I) -> Result<HttpRequest, BitlyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.client.build_get(EXPAND, &short_url_params(short_urls))
    }

    pub fn parse_expand(&self, response: HttpResponse) -> Result<Vec<Link>, BitlyError> {
        decode_keyed(self.client.parse_response(response)?, "expand")
    }

    pub fn build_info<I, S>(&self, short_urls: I) -> Result<HttpRequest, BitlyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.client.build_get(INFO, &short_url_params(short_urls))
    }

    pub fn parse_info(&self, response: HttpResponse) -> Result<Vec<Link>, BitlyError> {
        decode_keyed(self.client.parse_response(response)?, "info")
    }

    pub fn build_lookup<I, S>(&self, long_urls: I) -> Result<HttpRequest, BitlyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.client.build_get(LOOKUP, &lookup_params(long_urls))
    }

    pub fn parse_lookup(&self, response: HttpResponse) -> Result<Vec<Link>, BitlyError> {
        decode_keyed(self.client.parse_response(response)?, "link_lookup")
    }

    pub fn build_shorten(&self, long_url: &str) -> Result<HttpRequest, BitlyError> {
        self.client.build_get(SHORTEN, &shorten_params(long_url))
    }

    pub fn parse_shorten(&self, response: HttpResponse) -> Result<Link, BitlyError> {
        decode_direct(self.client.parse_response(response)?)
    }

    pub fn build_clicks(
        &self,
        short_url: &str,
        unit: TimeUnit,
        units: Units,
    ) -> Result<HttpRequest, BitlyError> {
        self.client.build_get(CLICKS, &clicks_params(short_url, unit, units))
    }

    pub fn parse_clicks(&self, response: HttpResponse) -> Result<Link, BitlyError> {
        decode_direct(self.client.parse_response(response)?)
    }

    pub fn build_popular(&self, unit: TimeUnit, units: Units) -> Result<HttpRequest, BitlyError> {
        self.client.build_get(POPULAR, &window_params(unit, units))
    }

    pub fn parse_popular(&self, response: HttpResponse) -> Result<PopularLinks, BitlyError> {
        decode_direct(self.client.parse_response(response)?)
    }
}

impl<'a, T: Transport> Links<'a, T> {
    /// Long URLs for the given short URLs.
    ///
    /// Unknown bitlinks come back as entries with `error` set to
    /// `NOT_FOUND` rather than failing the call.
    pub fn expand<I, S>(&self, short_urls: I) -> Result<Vec<Link>, BitlyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fetch_keyed(EXPAND, &short_url_params(short_urls), "expand")
    }

    /// Page title and creation metadata for the given short URLs.
    pub fn info<I, S>(&self, short_urls: I) -> Result<Vec<Link>, BitlyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fetch_keyed(INFO, &short_url_params(short_urls), "info")
    }

    /// Bitlinks already minted for the given long URLs.
    pub fn lookup<I, S>(&self, long_urls: I) -> Result<Vec<Link>, BitlyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fetch_keyed(LOOKUP, &lookup_params(long_urls), "link_lookup")
    }

    pub fn shorten(&self, long_url: &str) -> Result<Link, BitlyError> {
        decode_direct(self.client.get(SHORTEN, &shorten_params(long_url))?)
    }

    /// Click count for `short_url` over the last `units` of `unit`.
    pub fn clicks(&self, short_url: &str, unit: TimeUnit, units: Units) -> Result<Link, BitlyError> {
        decode_direct(self.client.get(CLICKS, &clicks_params(short_url, unit, units))?)
    }

    /// The caller's most clicked links over the last `units` of `unit`.
    pub fn popular(&self, unit: TimeUnit, units: Units) -> Result<PopularLinks, BitlyError> {
        decode_direct(self.client.get(POPULAR, &window_params(unit, units))?)
    }

    fn fetch_keyed(&self, path: &str, params: &QueryParams, key: &str) -> Result<Vec<Link>, BitlyError> {
        decode_keyed(self.client.get(path, params)?, key)
    }
}

fn short_url_params<I, S>(short_urls: I) -> QueryParams
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = QueryParams::new();
    params.extend("shortUrl", short_urls);
    params
}

fn lookup_params<I, S>(long_urls: I) -> QueryParams
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = QueryParams::new();
    params.extend("url", long_urls);
    params
}

fn shorten_params(long_url: &str) -> QueryParams {
    let mut params = QueryParams::new();
    params.push("longUrl", long_url);
    params
}

fn clicks_params(short_url: &str, unit: TimeUnit, units: Units) -> QueryParams {
    let mut params = QueryParams::new();
    params.push("link", short_url);
    params.push("unit", unit.as_str());
    params.push("units", units.to_string());
    params
}

fn window_params(unit: TimeUnit, units: Units) -> QueryParams {
    let mut params = QueryParams::new();
    params.push("unit", unit.as_str());
    params.push("units", units.to_string());
    params
}

/// Decode `{"<key>": [Link, ...]}` and take the list under `key`.
///
/// A missing key, or a `null` payload, yields an empty list.
fn decode_keyed(data: Value, key: &str) -> Result<Vec<Link>, BitlyError> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    let mut keyed: HashMap<String, Vec<Link>> = serde_json::from_value(data).map_err(BitlyError::decode)?;
    Ok(keyed.remove(key).unwrap_or_default())
}

/// Decode `data` straight into `D`; a `null` payload yields `D::default()`.
fn decode_direct<D: DeserializeOwned + Default>(data: Value) -> Result<D, BitlyError> {
    if data.is_null() {
        return Ok(D::default());
    }
    serde_json::from_value(data).map_err(BitlyError::decode)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::TransportError;

    const BASE: &str = "http://localhost:3000/v3";

    /// Replies with a fixed body and keeps the URLs it was asked for.
    struct MockApi {
        status: u16,
        body: String,
        urls: Mutex<Vec<String>>,
    }

    impl MockApi {
        fn ok(body: &str) -> Self {
            Self::with_status(200, body)
        }

        fn with_status(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn last_query(&self) -> Vec<(String, String)> {
            let urls = self.urls.lock().unwrap();
            let url = url::Url::parse(urls.last().unwrap()).unwrap();
            url.query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        }

        fn last_path(&self) -> String {
            let urls = self.urls.lock().unwrap();
            url::Url::parse(urls.last().unwrap()).unwrap().path().to_string()
        }
    }

    impl Transport for MockApi {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.urls.lock().unwrap().push(request.url.clone());
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    fn client(api: &MockApi) -> Client<&MockApi> {
        Client::with_transport(ClientConfig::new("token").with_base_url(BASE), api)
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn shorten_decodes_payload_directly() {
        let api = MockApi::ok(
            r#"{"status_code":200,"data":{"long_url":"http://google.com/","hash":"ze6poY","url":"http://bit.ly/ze6poY"}}"#,
        );
        let link = client(&api).links().shorten("http://google.com/").unwrap();

        assert_eq!(link.long_url, "http://google.com/");
        assert_eq!(link.hash, "ze6poY");
        assert_eq!(link.url, "http://bit.ly/ze6poY");
        assert_eq!(api.last_path(), "/v3/shorten");
        assert_eq!(
            api.last_query(),
            pairs(&[("longUrl", "http://google.com/"), ("access_token", "token")])
        );
    }

    #[test]
    fn expand_decodes_keyed_list() {
        let api = MockApi::ok(
            r#"{"status_code":200,"data":{"expand":[{"global_hash":"1RmnUT","long_url":"http://google.com","short_url":"http://bit.ly/1RmnUT"}]}}"#,
        );
        let links = client(&api).links().expand(["1RmnUT"]).unwrap();

        assert_eq!(
            links,
            vec![Link {
                global_hash: "1RmnUT".to_string(),
                long_url: "http://google.com".to_string(),
                short_url: "http://bit.ly/1RmnUT".to_string(),
                ..Link::default()
            }]
        );
        assert_eq!(api.last_path(), "/v3/expand");
    }

    #[test]
    fn expand_sends_repeated_short_urls() {
        let api = MockApi::ok(
            r#"{"status_code":200,"data":{"expand":[
                {"short_url":"http://bit.ly/a","long_url":"http://a.example/"},
                {"short_url":"http://bit.ly/b","long_url":"http://b.example/"},
                {"short_url":"http://bit.ly/c","error":"NOT_FOUND"}
            ]}}"#,
        );
        let short = ["http://bit.ly/a", "http://bit.ly/b", "http://bit.ly/c"];
        let links = client(&api).links().expand(short).unwrap();

        assert_eq!(
            api.last_query(),
            pairs(&[
                ("shortUrl", "http://bit.ly/a"),
                ("shortUrl", "http://bit.ly/b"),
                ("shortUrl", "http://bit.ly/c"),
                ("access_token", "token"),
            ])
        );
        assert_eq!(links.len(), 3);
        assert_eq!(links[1].long_url, "http://b.example/");
        assert_eq!(links[2].error, "NOT_FOUND");
        assert_eq!(links[2].long_url, "");
    }

    #[test]
    fn info_reads_info_key() {
        let api = MockApi::ok(
            r#"{"status_code":200,"data":{"info":[{"global_hash":"1RmnUT","short_url":"http://bit.ly/1RmnUT","title":"Google","user_hash":"1RmnUT","created_at":1212926400}]}}"#,
        );
        let links = client(&api).links().info(vec!["http://bit.ly/1RmnUT".to_string()]).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Google");
        assert_eq!(links[0].created_at, 1212926400);
        assert_eq!(api.last_path(), "/v3/info");
    }

    #[test]
    fn lookup_sends_url_params_and_reads_link_lookup_key() {
        let api = MockApi::ok(
            r#"{"status_code":200,"data":{"link_lookup":[{"url":"http://www.google.com/","aggregate_link":"http://bit.ly/2V6CFi"}]}}"#,
        );
        let links = client(&api).links().lookup(["http://www.google.com/"]).unwrap();

        assert_eq!(links[0].aggregate_link, "http://bit.ly/2V6CFi");
        assert_eq!(api.last_path(), "/v3/link/lookup");
        assert_eq!(
            api.last_query(),
            pairs(&[("url", "http://www.google.com/"), ("access_token", "token")])
        );
    }

    #[test]
    fn missing_key_yields_empty_list() {
        let api = MockApi::ok(r#"{"status_code":200,"data":{"something_else":[]}}"#);
        let links = client(&api).links().expand(["http://bit.ly/a"]).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn null_payload_yields_empty_list() {
        let api = MockApi::ok(r#"{"status_code":200,"data":null}"#);
        let links = client(&api).links().info(["http://bit.ly/a"]).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn clicks_sends_window_and_decodes_counts() {
        let api = MockApi::ok(
            r#"{"status_code":200,"data":{"link_clicks":12,"tz_offset":-4,"unit":"day","units":7}}"#,
        );
        let link = client(&api)
            .links()
            .clicks("http://bit.ly/1RmnUT", TimeUnit::Day, 7)
            .unwrap();

        assert_eq!(link.clicks, 12);
        assert_eq!(link.tz_offset, -4);
        assert_eq!(link.unit, "day");
        assert_eq!(link.units, 7);
        assert_eq!(api.last_path(), "/v3/link/clicks");
        assert_eq!(
            api.last_query(),
            pairs(&[
                ("link", "http://bit.ly/1RmnUT"),
                ("unit", "day"),
                ("units", "7"),
                ("access_token", "token"),
            ])
        );
    }

    #[test]
    fn popular_decodes_popular_links() {
        let api = MockApi::ok(
            r#"{"status_code":200,"data":{"popular_links":[{"link":"http://bit.ly/a","clicks":9},{"link":"http://bit.ly/b","clicks":3}]}}"#,
        );
        let popular = client(&api).links().popular(TimeUnit::Hour, -1).unwrap();

        assert_eq!(popular.links.len(), 2);
        assert_eq!(popular.links[0].link, "http://bit.ly/a");
        assert_eq!(popular.links[0].clicks_total, 9);
        assert_eq!(api.last_path(), "/v3/user/popular_links");
        assert_eq!(
            api.last_query(),
            pairs(&[("unit", "hour"), ("units", "-1"), ("access_token", "token")])
        );
    }

    #[test]
    fn every_operation_reports_api_error_for_http_failure() {
        let api = MockApi::with_status(500, "upstream exploded");
        let c = client(&api);
        let links = c.links();

        let errors = vec![
            links.expand(["a"]).unwrap_err(),
            links.info(["a"]).unwrap_err(),
            links.lookup(["a"]).unwrap_err(),
            links.shorten("a").unwrap_err(),
            links.clicks("a", TimeUnit::Day, 1).unwrap_err(),
            links.popular(TimeUnit::Day, 1).unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, BitlyError::Api { status_code: 500, .. }), "{err:?}");
        }
    }

    #[test]
    fn every_operation_reports_api_error_from_envelope() {
        let api = MockApi::ok(r#"{"status_code":403,"status_txt":"RATE_LIMIT_EXCEEDED","data":null}"#);
        let c = client(&api);

        let err = c.links().shorten("http://google.com/").unwrap_err();
        assert!(matches!(err, BitlyError::Api { status_code: 403, .. }));
        let err = c.links().popular(TimeUnit::Week, 1).unwrap_err();
        assert!(matches!(err, BitlyError::Api { status_code: 403, .. }));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let api = MockApi::ok("{not json");
        let err = client(&api).links().expand(["a"]).unwrap_err();
        assert!(matches!(err, BitlyError::Decode(_)));
    }

    #[test]
    fn unexpected_payload_shape_is_decode_error() {
        let api = MockApi::ok(r#"{"status_code":200,"data":{"expand":"not a list"}}"#);
        let err = client(&api).links().expand(["a"]).unwrap_err();
        assert!(matches!(err, BitlyError::Decode(_)));

        let api = MockApi::ok(r#"{"status_code":200,"data":["not","an","object"]}"#);
        let err = client(&api).links().shorten("a").unwrap_err();
        assert!(matches!(err, BitlyError::Decode(_)));
    }

    #[test]
    fn build_and_parse_work_without_transport() {
        let client = Client::with_transport(ClientConfig::new("token").with_base_url(BASE), ());
        let links = client.links();

        let req = links.build_info(["http://bit.ly/x"]).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/v3/info?shortUrl=http%3A%2F%2Fbit.ly%2Fx&access_token=token"
        );

        let parsed = links
            .parse_info(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: r#"{"status_code":200,"data":{"info":[{"title":"X"}]}}"#.to_string(),
            })
            .unwrap();
        assert_eq!(parsed[0].title, "X");
    }
}
