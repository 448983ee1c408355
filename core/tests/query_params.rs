use http::HeaderMap;
use paramstyle_core::{
    decode_params, FieldLayout, FieldSet, Location, ParamDescriptor, ParamError, ParamField,
    ParamObject, ParamResult, ParamSpec, ParamStruct, PathParams, PropertySet, QueryValues,
    RawParam, RequestParams, Style,
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

fn decode<T: ParamStruct>(query: &str) -> ParamResult<T> {
    let path = PathParams::new();
    let query = QueryValues::parse(query);
    let headers = HeaderMap::new();
    decode_params(&RequestParams::new(&path, &query, &headers))
}

#[derive(Debug, Default, PartialEq)]
struct FormPrimitives {
    text: String,
    count: u32,
    offset: i64,
    ratio: f64,
    flag: bool,
    limit: Option<u16>,
}

impl ParamStruct for FormPrimitives {
    fn describe(fields: &mut FieldSet<Self>) {
        fields
            .tag("formstr,in=query", |p| &p.text, |p| &mut p.text)
            .tag("formuint,in=query", |p| &p.count, |p| &mut p.count)
            .tag("formint,in=query,explode", |p| &p.offset, |p| &mut p.offset)
            .tag("formfloat,in=query", |p| &p.ratio, |p| &mut p.ratio)
            .tag("formbool,in=query", |p| &p.flag, |p| &mut p.flag)
            .tag("limit,in=query", |p| &p.limit, |p| &mut p.limit);
    }
}

#[test]
fn test_form_primitives() {
    let decoded: FormPrimitives =
        decode("formstr=a+test+string&formuint=123&formint=-123&formfloat=123.45&formbool=true")
            .unwrap();
    assert_eq!(
        decoded,
        FormPrimitives {
            text: "a test string".into(),
            count: 123,
            offset: -123,
            ratio: 123.45,
            flag: true,
            limit: None,
        }
    );
}

#[test]
fn test_optional_query_value_present() {
    let decoded: FormPrimitives = decode("limit=25").unwrap();
    assert_eq!(decoded.limit, Some(25));
}

#[test]
fn test_notabool_is_invalid() {
    let err = decode::<FormPrimitives>("formbool=notabool").unwrap_err();
    assert_eq!(err, ParamError::invalid(Location::Query, "formbool", "notabool"));
    assert_eq!(
        err.to_string(),
        "query parameter formbool was improperly formatted: notabool"
    );
}

#[derive(Debug, Default, PartialEq)]
struct FormComplex {
    strs: Vec<String>,
    ints: Vec<i32>,
    object: StructParam,
    ex_strs: Vec<String>,
    ex_floats: Vec<f64>,
    ex_object: Option<StructParam>,
}

impl ParamStruct for FormComplex {
    fn describe(fields: &mut FieldSet<Self>) {
        fields
            .tag("formstr,in=query", |p| &p.strs, |p| &mut p.strs)
            .tag("formint,in=query", |p| &p.ints, |p| &mut p.ints)
            .tag("formstruct,in=query", |p| &p.object, |p| &mut p.object)
            .tag("formexstr,in=query,explode", |p| &p.ex_strs, |p| &mut p.ex_strs)
            .tag("formexfloat,in=query,explode", |p| &p.ex_floats, |p| &mut p.ex_floats)
            .tag("formexstruct,in=query,explode", |p| &p.ex_object, |p| &mut p.ex_object);
    }
}

#[test]
fn test_form_complex() {
    let decoded: FormComplex = decode(
        "formstr=string1,string2&formint=123,-123\
         &formstruct=stringprop,propstring,intprop,123\
         &formexstr=string3&formexstr=string4\
         &formexfloat=-123.45&formexfloat=1\
         &stringprop=propstring&intprop=123",
    )
    .unwrap();
    assert_eq!(
        decoded,
        FormComplex {
            strs: vec!["string1".into(), "string2".into()],
            ints: vec![123, -123],
            object: expected_struct(),
            ex_strs: vec!["string3".into(), "string4".into()],
            ex_floats: vec![-123.45, 1.0],
            ex_object: Some(expected_struct()),
        }
    );
}

#[test]
fn test_exploded_object_absent_without_property_keys() {
    let decoded: FormComplex = decode("formstr=a&formint=1").unwrap();
    assert_eq!(decoded.ex_object, None);
    assert!(decoded.ex_strs.is_empty());
}

#[derive(Debug, Default, PartialEq)]
struct Delimited {
    spaced: Vec<u8>,
    piped: Vec<String>,
    spaced_ex: Vec<i16>,
    piped_ex: Vec<u64>,
}

impl ParamStruct for Delimited {
    fn describe(fields: &mut FieldSet<Self>) {
        fields
            .field(
                ParamSpec::query("spaceint").style(Style::SpaceDelimited),
                |p| &p.spaced,
                |p| &mut p.spaced,
            )
            .field(
                ParamSpec::query("pipestr").style(Style::PipeDelimited),
                |p| &p.piped,
                |p| &mut p.piped,
            )
            .tag(
                "spaceexint,in=query,style=spaceDelimited,explode",
                |p| &p.spaced_ex,
                |p| &mut p.spaced_ex,
            )
            .tag(
                "pipeexuint,in=query,style=pipeDelimited,explode",
                |p| &p.piped_ex,
                |p| &mut p.piped_ex,
            );
    }
}

#[test]
fn test_space_and_pipe_delimited() {
    let decoded: Delimited = decode(
        "spaceint=0%20255&pipestr=a|b|c&spaceexint=-1&spaceexint=2&pipeexuint=7&pipeexuint=8",
    )
    .unwrap();
    assert_eq!(
        decoded,
        Delimited {
            spaced: vec![0, 255],
            piped: vec!["a".into(), "b".into(), "c".into()],
            spaced_ex: vec![-1, 2],
            piped_ex: vec![7, 8],
        }
    );
}

#[test]
fn test_delimited_element_out_of_range() {
    let err = decode::<Delimited>("spaceint=1+256").unwrap_err();
    assert_eq!(err, ParamError::invalid(Location::Query, "spaceint", "1 256"));
}

#[derive(Debug, Default, PartialEq)]
struct Deep {
    filter: StructParam,
}

impl ParamStruct for Deep {
    fn describe(fields: &mut FieldSet<Self>) {
        fields.tag(
            "deepstruct,in=query,style=deepObject,required",
            |p| &p.filter,
            |p| &mut p.filter,
        );
    }
}

#[test]
fn test_deep_object() {
    let decoded: Deep =
        decode("deepstruct%5Bstringprop%5D=propstring&deepstruct%5Bintprop%5D=123").unwrap();
    assert_eq!(decoded.filter, expected_struct());
}

#[test]
fn test_deep_object_required_missing() {
    let err = decode::<Deep>("stringprop=propstring").unwrap_err();
    assert_eq!(err, ParamError::required(Location::Query, "deepstruct"));
    assert_eq!(err.to_string(), "missing required query parameter deepstruct");
    assert_eq!(err.status_code(), http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[derive(Debug, Default, PartialEq)]
struct SortOrder(Vec<(String, bool)>);

impl paramstyle_core::CustomParam for SortOrder {
    fn decode_param(&mut self, raw: RawParam<'_>, descriptor: &ParamDescriptor) -> ParamResult<()> {
        let RawParam::Query(query) = raw else {
            return Err(ParamError::configuration("sort must be a query parameter"));
        };
        for value in query.get_all(&descriptor.name) {
            let (key, ascending) = match value.strip_prefix('-') {
                Some(key) => (key, false),
                None => (value.as_str(), true),
            };
            if key.is_empty() {
                return Err(ParamError::custom(
                    descriptor.location,
                    &descriptor.name,
                    "empty sort key",
                ));
            }
            self.0.push((key.to_string(), ascending));
        }
        Ok(())
    }
}

impl ParamField for SortOrder {
    fn layout() -> ParamResult<FieldLayout<Self>> {
        FieldLayout::custom()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Search {
    sort: SortOrder,
}

impl ParamStruct for Search {
    fn describe(fields: &mut FieldSet<Self>) {
        fields.tag("sort,in=query", |p| &p.sort, |p| &mut p.sort);
    }
}

#[test]
fn test_custom_query_param_sees_whole_multimap() {
    let decoded: Search = decode("sort=name&sort=-created").unwrap();
    assert_eq!(
        decoded.sort,
        SortOrder(vec![("name".into(), true), ("created".into(), false)])
    );
}

#[test]
fn test_custom_query_param_rejection() {
    let err = decode::<Search>("sort=-").unwrap_err();
    assert_eq!(err.to_string(), "query parameter sort was rejected: empty sort key");
}

#[test]
fn test_custom_query_param_skipped_when_absent() {
    let decoded: Search = decode("other=1").unwrap();
    assert_eq!(decoded, Search::default());
}
