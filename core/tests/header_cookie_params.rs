use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use paramstyle_core::{
    decode_params, encode_params, CustomParam, FieldLayout, FieldSet, Location,
    ParamDescriptor, ParamError, ParamField, ParamObject, ParamResult, ParamStruct, PathParams,
    PropertySet, QueryValues, RawParam, RequestParams,
};
use pretty_assertions::assert_eq;

#[derive(Debug, Default, Clone, PartialEq)]
struct StructParam {
    string_prop: String,
    int_prop: i64,
}

impl ParamObject for StructParam {
    fn describe(props: &mut PropertySet<Self>) {
        props
            .property("stringprop", |s| &s.string_prop, |s| &mut s.string_prop)
            .property("intprop", |s| &s.int_prop, |s| &mut s.int_prop);
    }
}

impl ParamField for StructParam {
    fn layout() -> ParamResult<FieldLayout<Self>> {
        FieldLayout::object()
    }
}

fn expected_struct() -> StructParam {
    StructParam {
        string_prop: "propstring".into(),
        int_prop: 123,
    }
}

fn request(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.append(*name, HeaderValue::from_static(value));
    }
    headers
}

fn decode<T: ParamStruct>(headers: &HeaderMap) -> ParamResult<T> {
    let path = PathParams::new();
    let query = QueryValues::new();
    decode_params(&RequestParams::new(&path, &query, headers))
}

/// Every line of a repeated header, joined in request order.
#[derive(Debug, Default, Clone, PartialEq)]
struct Tags(Vec<String>);

impl CustomParam for Tags {
    fn decode_param(&mut self, raw: RawParam<'_>, descriptor: &ParamDescriptor) -> ParamResult<()> {
        match raw {
            RawParam::Header(lines) => {
                self.0 = lines
                    .iter()
                    .flat_map(|line| line.split(','))
                    .map(|tag| tag.trim().to_string())
                    .collect();
                Ok(())
            }
            _ => Err(ParamError::custom(
                descriptor.location,
                &descriptor.name,
                "tags are only sent as headers",
            )),
        }
    }

    fn encode_param(&self, _descriptor: &ParamDescriptor) -> ParamResult<Vec<String>> {
        Ok(self.0.clone())
    }
}

impl ParamField for Tags {
    fn layout() -> ParamResult<FieldLayout<Self>> {
        FieldLayout::custom()
    }
}

#[derive(Debug, Default, PartialEq)]
struct HeaderParams {
    request_id: String,
    retries: u8,
    ids: Vec<i32>,
    object: StructParam,
    ex_object: StructParam,
    tags: Tags,
    trace: Option<String>,
}

impl ParamStruct for HeaderParams {
    fn describe(fields: &mut FieldSet<Self>) {
        fields
            .tag("x-request-id,in=header,required", |p| &p.request_id, |p| &mut p.request_id)
            .tag("x-retries,in=header", |p| &p.retries, |p| &mut p.retries)
            .tag("x-ids,in=header", |p| &p.ids, |p| &mut p.ids)
            .tag("x-struct,in=header", |p| &p.object, |p| &mut p.object)
            .tag("x-exstruct,in=header,explode", |p| &p.ex_object, |p| &mut p.ex_object)
            .tag("x-tag,in=header", |p| &p.tags, |p| &mut p.tags)
            .tag("x-trace,in=header", |p| &p.trace, |p| &mut p.trace);
    }
}

#[test]
fn test_header_values() {
    let headers = request(&[
        ("x-request-id", "abc-123"),
        ("x-retries", "3"),
        ("x-ids", "1,2,-3"),
        ("x-struct", "stringprop,propstring,intprop,123"),
        ("x-exstruct", "stringprop=propstring,intprop=123"),
        ("x-tag", "red, green"),
        ("x-tag", "blue"),
    ]);
    let decoded: HeaderParams = decode(&headers).unwrap();
    assert_eq!(
        decoded,
        HeaderParams {
            request_id: "abc-123".into(),
            retries: 3,
            ids: vec![1, 2, -3],
            object: expected_struct(),
            ex_object: expected_struct(),
            tags: Tags(vec!["red".into(), "green".into(), "blue".into()]),
            trace: None,
        }
    );
}

#[test]
fn test_header_names_ignore_case() {
    #[derive(Debug, Default)]
    struct Mixed {
        id: String,
    }

    impl ParamStruct for Mixed {
        fn describe(fields: &mut FieldSet<Self>) {
            fields.tag("X-Request-ID,in=header", |p| &p.id, |p| &mut p.id);
        }
    }

    let decoded: Mixed = decode(&request(&[("x-request-id", "upper")])).unwrap();
    assert_eq!(decoded.id, "upper");
}

#[test]
fn test_missing_required_header() {
    let err = decode::<HeaderParams>(&request(&[("x-retries", "1")])).unwrap_err();
    assert_eq!(err, ParamError::required(Location::Header, "x-request-id"));
}

#[test]
fn test_header_out_of_range() {
    let headers = request(&[("x-request-id", "a"), ("x-retries", "300")]);
    let err = decode::<HeaderParams>(&headers).unwrap_err();
    assert_eq!(err, ParamError::invalid(Location::Header, "x-retries", "300"));
}

#[derive(Debug, Default, PartialEq)]
struct CookieParams {
    session: String,
    admin: bool,
    object: StructParam,
    ex_object: Option<StructParam>,
    scores: Vec<f32>,
}

impl ParamStruct for CookieParams {
    fn describe(fields: &mut FieldSet<Self>) {
        fields
            .tag("session,in=cookie,required", |p| &p.session, |p| &mut p.session)
            .tag("admin,in=cookie", |p| &p.admin, |p| &mut p.admin)
            .tag("formstruct,in=cookie", |p| &p.object, |p| &mut p.object)
            .tag("formexstruct,in=cookie,explode", |p| &p.ex_object, |p| &mut p.ex_object)
            .tag("scores,in=cookie", |p| &p.scores, |p| &mut p.scores);
    }
}

#[test]
fn test_cookie_values() {
    let headers = request(&[
        ("cookie", "session=s1; admin=true"),
        ("cookie", "formstruct=stringprop,propstring,intprop,123; scores=1.5,2"),
    ]);
    let decoded: CookieParams = decode(&headers).unwrap();
    assert_eq!(
        decoded,
        CookieParams {
            session: "s1".into(),
            admin: true,
            object: expected_struct(),
            ex_object: None,
            scores: vec![1.5, 2.0],
        }
    );
}

#[test]
fn test_cookie_notabool() {
    let headers = request(&[("cookie", "session=s1; admin=notabool")]);
    let err = decode::<CookieParams>(&headers).unwrap_err();
    assert_eq!(err, ParamError::invalid(Location::Cookie, "admin", "notabool"));
}

#[test]
fn test_missing_required_cookie() {
    let headers = request(&[("cookie", "admin=false")]);
    let err = decode::<CookieParams>(&headers).unwrap_err();
    assert_eq!(err.to_string(), "missing required cookie parameter session");
}

#[derive(Debug, Default)]
struct ResponseParams {
    request_id: String,
    rate_limit: Option<u32>,
    links: Vec<String>,
    tags: Tags,
    session: String,
    prefs: Option<StructParam>,
    page: u32,
}

impl ParamStruct for ResponseParams {
    fn describe(fields: &mut FieldSet<Self>) {
        fields
            .tag("x-request-id,in=header", |p| &p.request_id, |p| &mut p.request_id)
            .tag("x-rate-limit,in=header", |p| &p.rate_limit, |p| &mut p.rate_limit)
            .tag("x-links,in=header", |p| &p.links, |p| &mut p.links)
            .tag("x-tag,in=header", |p| &p.tags, |p| &mut p.tags)
            .tag("session,in=cookie", |p| &p.session, |p| &mut p.session)
            .tag("prefs,in=cookie", |p| &p.prefs, |p| &mut p.prefs)
            .tag("page,in=query", |p| &p.page, |p| &mut p.page);
    }
}

fn values<'h>(headers: &'h HeaderMap, name: &str) -> Vec<&'h str> {
    headers
        .get_all(name)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect()
}

#[test]
fn test_encode_response_headers_and_cookies() {
    let response = ResponseParams {
        request_id: "abc".into(),
        rate_limit: None,
        links: vec!["a".into(), "b".into()],
        tags: Tags(vec!["red".into(), "blue".into()]),
        session: "s1".into(),
        prefs: Some(expected_struct()),
        page: 4,
    };
    let headers = encode_params(&response).unwrap();

    assert_eq!(values(&headers, "x-request-id"), vec!["abc"]);
    assert!(headers.get("x-rate-limit").is_none());
    assert_eq!(values(&headers, "x-links"), vec!["a,b"]);
    assert_eq!(values(&headers, "x-tag"), vec!["red", "blue"]);
    assert_eq!(
        values(&headers, SET_COOKIE.as_str()),
        vec!["session=s1", "prefs=stringprop,propstring,intprop,123"]
    );
    assert!(headers.get("page").is_none());
}

#[test]
fn test_encode_rejects_invalid_header_text() {
    let response = ResponseParams {
        request_id: "line\nbreak".into(),
        ..Default::default()
    };
    let err = encode_params(&response).unwrap_err();
    assert_eq!(
        err,
        ParamError::invalid(Location::Header, "x-request-id", "line\nbreak")
    );
}

#[test]
fn test_encoded_headers_decode_back() {
    #[derive(Debug, Default, PartialEq)]
    struct Echo {
        id: String,
        limits: Vec<u16>,
        object: StructParam,
    }

    impl ParamStruct for Echo {
        fn describe(fields: &mut FieldSet<Self>) {
            fields
                .tag("x-id,in=header", |p| &p.id, |p| &mut p.id)
                .tag("x-limits,in=header,explode", |p| &p.limits, |p| &mut p.limits)
                .tag("x-obj,in=header,explode", |p| &p.object, |p| &mut p.object);
        }
    }

    let sent = Echo {
        id: "e-1".into(),
        limits: vec![10, 20],
        object: expected_struct(),
    };
    let headers = encode_params(&sent).unwrap();
    assert_eq!(values(&headers, "x-obj"), vec!["stringprop=propstring,intprop=123"]);
    let received: Echo = decode(&headers).unwrap();
    assert_eq!(received, sent);
}

#[derive(Debug, Default, PartialEq)]
struct Preferences {
    theme: String,
    layout: Vec<String>,
}

impl ParamStruct for Preferences {
    fn describe(fields: &mut FieldSet<Self>) {
        fields
            .tag("theme,in=cookie", |p| &p.theme, |p| &mut p.theme)
            .tag("layout,in=cookie", |p| &p.layout, |p| &mut p.layout);
    }
}

#[test]
fn test_cookie_value_with_separator_is_rejected() {
    let prefs = Preferences {
        theme: "dark;admin=true".into(),
        layout: Vec::new(),
    };
    let err = encode_params(&prefs).unwrap_err();
    assert_eq!(
        err,
        ParamError::invalid(Location::Cookie, "theme", "dark;admin=true")
    );
}

#[test]
fn test_set_cookie_lines_decode_back_as_cookies() {
    let sent = Preferences {
        theme: "dark-blue".into(),
        layout: vec!["grid".into(), "wide".into()],
    };
    let encoded = encode_params(&sent).unwrap();
    let mut request = HeaderMap::new();
    for line in encoded.get_all(SET_COOKIE) {
        request.append("cookie", line.clone());
    }
    let received: Preferences = decode(&request).unwrap();
    assert_eq!(received, sent);
}

#[test]
fn test_declared_styles_are_forced_for_headers_and_cookies() {
    #[derive(Debug, Default)]
    struct Styled {
        trace: Vec<u8>,
        session: String,
    }

    impl ParamStruct for Styled {
        fn describe(fields: &mut FieldSet<Self>) {
            fields
                .tag("x-trace,in=header,style=label", |p| &p.trace, |p| &mut p.trace)
                .tag("session,in=cookie,style=simple", |p| &p.session, |p| &mut p.session);
        }
    }

    let headers = request(&[("x-trace", "1,2"), ("cookie", "session=s9")]);
    let decoded: Styled = decode(&headers).unwrap();
    assert_eq!(decoded.trace, vec![1, 2]);
    assert_eq!(decoded.session, "s9");

    let descriptors = paramstyle_core::descriptors::<Styled>().unwrap();
    assert_eq!(descriptors[0].style, paramstyle_core::Style::Simple);
    assert_eq!(descriptors[1].style, paramstyle_core::Style::Form);
}
