//! Integration tests for `PropertyEncoder`.

mod common;

use common::{component, create_output, custom, legacy, modern, resource_set, with_references};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value, json};
use tessera_core::RunContext;
use tessera_core::sig::{
    ARCHIVE_SIG, ASSET_SIG, OUTPUT_VALUE_SIG, RESOURCE_SIG, SECRET_SIG, SIG_KEY,
};
use tessera_core::unknown::UNKNOWN;
use tessera_core::{Archive, Asset, AssetOrArchive};
use tessera_output::error::InputError;
use tessera_output::input::{Input, InputType};
use tessera_output::output::Output;
use tessera_output::resource::{ResourceHandle, ResourceSet};
use tessera_rpc::encode::PropertyEncoder;
use tessera_rpc::error::EncodeError;

async fn encode_with(ctx: RunContext, input: impl Into<Input>) -> (Value, Vec<ResourceHandle>) {
    let mut deps = Vec::new();
    let value = PropertyEncoder::new(ctx)
        .encode(&input.into(), &mut deps)
        .await
        .unwrap();
    (value, deps)
}

// ─────────────────────────────────────────────────────────────────────────────
// Plain data and futures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_encodes_to_itself() {
    let (value, deps) = encode_with(legacy(), vec![1, 2, 3]).await;
    assert_eq!(value, json!([1, 2, 3]));
    assert!(deps.is_empty());
}

#[tokio::test]
async fn strings_are_not_sequences() {
    let (value, _) = encode_with(legacy(), "hello world").await;
    assert_eq!(value, json!("hello world"));
}

#[tokio::test]
async fn futures_are_awaited() {
    let input = Input::future(async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        Ok(Input::from(42))
    });
    let (value, _) = encode_with(legacy(), input).await;
    assert_eq!(value, json!(42));
}

#[tokio::test]
async fn maps_await_nested_futures() {
    let input = Input::from_iter([
        ("a", Input::from(42)),
        ("b", Input::future(async { Ok(Input::from(99)) })),
    ]);
    let (value, _) = encode_with(legacy(), input).await;
    assert_eq!(value, json!({"a": 42, "b": 99}));
}

#[tokio::test]
async fn shared_future_encodes_twice_without_rerunning() {
    let input = Input::future(async { Ok(Input::from("once")) });
    let encoder = PropertyEncoder::new(legacy());

    let first = encoder.encode(&input, &mut Vec::new()).await.unwrap();
    let second = encoder.encode(&input.clone(), &mut Vec::new()).await.unwrap();
    assert_eq!(first, second);
}

// ─────────────────────────────────────────────────────────────────────────────
// Resources
// ─────────────────────────────────────────────────────────────────────────────

const FAKE_URN: &str = "urn:tessera:mystack::myproject::my:mod:Fake::fake";

#[tokio::test]
async fn custom_resource_encodes_to_id_or_reference() {
    common::init_tracing();
    let res = custom(FAKE_URN);

    let (value, deps) = encode_with(legacy(), &res).await;
    assert_eq!(deps, [res.clone()]);
    assert_eq!(value, json!("id"));

    let (value, deps) = encode_with(with_references(), &res).await;
    assert_eq!(deps, [res.clone()]);
    assert_eq!(
        value,
        json!({SIG_KEY: RESOURCE_SIG, "urn": FAKE_URN, "id": "id"})
    );
}

#[tokio::test]
async fn component_resource_encodes_to_urn_or_reference() {
    let res = component(FAKE_URN);

    let (value, deps) = encode_with(legacy(), &res).await;
    assert_eq!(deps, [res.clone()]);
    assert_eq!(value, json!(FAKE_URN));

    let (value, deps) = encode_with(with_references(), &res).await;
    assert_eq!(deps, [res.clone()]);
    assert_eq!(value, json!({SIG_KEY: RESOURCE_SIG, "urn": FAKE_URN}));
}

#[tokio::test]
async fn lifted_resources_encode_like_bare_ones() {
    let res = custom(FAKE_URN);
    let comp = component("urn:c");
    let lifted = || Output::from_input(vec![Input::from(&res), Input::from(&comp)]);

    let (value, deps) = encode_with(legacy(), lifted()).await;
    assert_eq!(value, json!(["id", "urn:c"]));
    assert_eq!(deps, [res.clone(), comp.clone()]);

    let (value, _) = encode_with(with_references(), lifted()).await;
    assert_eq!(
        value,
        json!([
            {SIG_KEY: RESOURCE_SIG, "urn": FAKE_URN, "id": "id"},
            {SIG_KEY: RESOURCE_SIG, "urn": "urn:c"},
        ])
    );
}

#[tokio::test]
async fn reference_with_empty_id_collapses_to_urn() {
    let reference = json!({"target": {SIG_KEY: RESOURCE_SIG, "urn": "urn:x", "id": ""}});

    let (value, deps) = encode_with(legacy(), reference).await;
    assert_eq!(value, json!({"target": "urn:x"}));
    assert!(deps.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Assets and archives
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn assets_encode_to_tagged_maps() {
    let cases = [
        (Asset::text("Rust is cool"), "text", "Rust is cool"),
        (Asset::file("foo.txt"), "path", "foo.txt"),
        (Asset::remote("https://example.com"), "uri", "https://example.com"),
    ];
    for (asset, field, content) in cases {
        let (value, _) = encode_with(legacy(), asset).await;
        assert_eq!(value[SIG_KEY], json!(ASSET_SIG));
        assert_eq!(value[field], json!(content));
    }
}

#[tokio::test]
async fn archives_encode_members_without_key_transform() {
    let archive = Archive::assets([("foo_bar", AssetOrArchive::from(Asset::text("bar")))]);
    let mut deps = Vec::new();
    let value = PropertyEncoder::new(legacy())
        .with_key_transform(|k| k.replace('_', "-"))
        .encode(&archive.into(), &mut deps)
        .await
        .unwrap();

    assert_eq!(
        value,
        json!({
            SIG_KEY: ARCHIVE_SIG,
            "assets": {"foo_bar": {SIG_KEY: ASSET_SIG, "text": "bar"}}
        })
    );

    let (value, _) = encode_with(legacy(), Archive::remote("https://example.com")).await;
    assert_eq!(value["uri"], json!("https://example.com"));
    let (value, _) = encode_with(legacy(), Archive::file("foo.tar.gz")).await;
    assert_eq!(value["path"], json!("foo.tar.gz"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Outputs
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn output_appends_dependencies_after_existing() {
    let existing = custom("existing-dependency");
    let res = custom("some-dependency");
    let out = create_output(json!(42), true, false, resource_set(&[&res]));

    let mut deps = vec![existing.clone()];
    let value = PropertyEncoder::new(legacy())
        .encode(&out.into(), &mut deps)
        .await
        .unwrap();
    assert_eq!(deps, [existing, res]);
    assert_eq!(value, json!(42));
}

#[tokio::test]
async fn unknown_output_encodes_to_sentinel_and_keeps_dependencies() {
    let res = custom("some-dependency");
    let out = create_output(Value::Null, false, false, resource_set(&[&res]));

    let (value, deps) = encode_with(RunContext::preview(), out).await;
    assert_eq!(deps, [res]);
    assert_eq!(value, json!(UNKNOWN));
}

#[tokio::test]
async fn all_composes_dependencies() {
    let res = custom("some-resource");
    let other = custom("some-other-resource");
    let combined = Output::all([
        create_output(json!(42), true, false, resource_set(&[&res])),
        create_output(json!(99), true, false, resource_set(&[&other])),
    ]);

    let (value, deps) = encode_with(legacy(), combined).await;
    assert_eq!(deps, [res, other]);
    assert_eq!(value, json!([42, 99]));
}

#[tokio::test]
async fn all_encodes_unknown_if_any_element_is() {
    let res = custom("some-resource");
    let other = custom("some-other-resource");
    let combined = Output::all([
        create_output(json!(42), true, false, resource_set(&[&res])),
        create_output(json!(UNKNOWN), false, false, resource_set(&[&other])),
    ]);

    let (value, deps) = encode_with(RunContext::preview(), combined).await;
    assert_eq!(deps.len(), 2);
    assert_eq!(value, json!(UNKNOWN));
}

#[tokio::test]
async fn transform_on_unknown_is_never_invoked_while_encoding() {
    let ctx = RunContext::preview();
    let out = create_output(json!(1), false, false, ResourceSet::new())
        .apply(&ctx, |_| -> Value { panic!("transform must not run") });

    let (value, _) = encode_with(ctx, out).await;
    assert_eq!(value, json!(UNKNOWN));
}

#[tokio::test]
async fn secret_output_wraps_only_with_support() {
    let out = create_output(json!("hunter2"), true, true, ResourceSet::new());

    let (value, _) = encode_with(legacy(), out.clone()).await;
    assert_eq!(value, json!("hunter2"));

    let (value, _) = encode_with(modern(), out).await;
    assert_eq!(value, json!({SIG_KEY: SECRET_SIG, "value": "hunter2"}));
}

#[tokio::test]
async fn output_values_carry_facts_when_enabled() {
    let b = custom("urn:b");
    let a = custom("urn:a");
    let known = create_output(json!("v"), true, true, resource_set(&[&b, &a]));
    let unknown = create_output(Value::Null, false, false, resource_set(&[&a]));
    let encoder = PropertyEncoder::new(modern()).with_output_values(true);

    let mut deps = Vec::new();
    let value = encoder.encode(&known.clone().into(), &mut deps).await.unwrap();
    assert_eq!(
        value,
        json!({
            SIG_KEY: OUTPUT_VALUE_SIG,
            "value": "v",
            "secret": true,
            "dependencies": ["urn:a", "urn:b"],
        })
    );
    assert_eq!(deps, [b, a.clone()]);

    let value = encoder.encode(&unknown.into(), &mut Vec::new()).await.unwrap();
    assert_eq!(
        value,
        json!({SIG_KEY: OUTPUT_VALUE_SIG, "dependencies": ["urn:a"]})
    );

    // Without engine support the flag has no effect.
    let value = PropertyEncoder::new(legacy())
        .with_output_values(true)
        .encode(&known.into(), &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(value, json!("v"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Unsupported inputs
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unexpected_types_are_rejected() {
    #[derive(Serialize)]
    struct MyClass {
        prop: String,
    }

    let err = PropertyEncoder::new(legacy())
        .encode_serializable(
            &MyClass {
                prop: "oh no!".into(),
            },
            &mut Vec::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "unexpected input of type MyClass");
}

#[tokio::test]
async fn unsupported_sequences_are_rejected() {
    let encoder = PropertyEncoder::new(legacy());
    let mut sink = Vec::new();

    let tuple = encoder.encode_serializable(&("hi", 42), &mut sink).await;
    let range = encoder.encode_serializable(&(0..10), &mut sink).await;
    let fixed_array = encoder.encode_serializable(&[0u8; 10], &mut sink).await;

    for result in [tuple, range, fixed_array] {
        assert!(matches!(
            result,
            Err(EncodeError::Input(InputError::UnsupportedShape(_)))
        ));
    }
}

#[tokio::test]
async fn byte_buffers_are_rejected_but_byte_vectors_are_lists() {
    struct Blob(&'static [u8]);

    impl Serialize for Blob {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(self.0)
        }
    }

    let encoder = PropertyEncoder::new(legacy());
    let mut sink = Vec::new();

    assert_eq!(
        encoder.encode_serializable(&Blob(b"raw"), &mut sink).await,
        Err(EncodeError::Input(InputError::UnsupportedShape("byte buffer")))
    );
    assert_eq!(
        encoder.encode_serializable(&vec![0u8, 1, 2], &mut sink).await,
        Ok(json!([0, 1, 2]))
    );
}

#[tokio::test]
async fn serializable_data_encodes_like_plain_data() {
    let mut tags = IndexMap::new();
    tags.insert("env", vec!["prod", "eu"]);

    let value = PropertyEncoder::new(legacy())
        .encode_serializable(&tags, &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(value, json!({"env": ["prod", "eu"]}));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument bags
// ─────────────────────────────────────────────────────────────────────────────

#[derive(InputType)]
struct FooArgs {
    #[input(name = "firstArg")]
    first_arg: Input,
    #[input(name = "secondArg")]
    second_arg: Option<Input>,
}

#[derive(InputType)]
struct ListDictInputArgs {
    a: Vec<Input>,
    b: Vec<Input>,
    c: IndexMap<String, Input>,
    d: IndexMap<String, Input>,
}

#[derive(InputType)]
struct BarArgs {
    #[input(name = "tagArgs")]
    tag_args: Input,
}

#[tokio::test]
async fn simple_input_type() {
    let it = FooArgs {
        first_arg: "hello".into(),
        second_arg: Some(42.into()),
    };
    let (value, _) = encode_with(legacy(), it).await;
    assert_eq!(value, json!({"firstArg": "hello", "secondArg": 42}));
}

#[tokio::test]
async fn list_dict_input_type() {
    let it = ListDictInputArgs {
        a: vec!["hi".into()],
        b: vec!["there".into()],
        c: IndexMap::from([("hello".to_owned(), Input::from("world"))]),
        d: IndexMap::from([("foo".to_owned(), Input::from("bar"))]),
    };
    let (value, _) = encode_with(legacy(), it).await;
    assert_eq!(
        value,
        json!({
            "a": ["hi"],
            "b": ["there"],
            "c": {"hello": "world"},
            "d": {"foo": "bar"},
        })
    );
}

#[tokio::test]
async fn input_type_keys_are_not_transformed() {
    fn transformer(prop: &str) -> String {
        match prop {
            "tag_args" => "a",
            "tagArgs" => "b",
            "foo_bar" => "c",
            other => other,
        }
        .to_owned()
    }

    let it = BarArgs {
        tag_args: json!({"foo_bar": "hello", "foo_baz": "world"}).into(),
    };
    let mut deps = Vec::new();
    let value = PropertyEncoder::new(legacy())
        .with_key_transform(transformer)
        .encode(&it.into(), &mut deps)
        .await
        .unwrap();

    // Wire names stay; keys of nested maps are still rewritten.
    assert_eq!(value, json!({"tagArgs": {"c": "hello", "foo_baz": "world"}}));
}

#[tokio::test]
async fn derived_args_keep_dependencies_of_fields() {
    let res = custom("urn:dep");
    let it = FooArgs {
        first_arg: create_output(json!("x"), true, false, resource_set(&[&res])).into(),
        second_arg: Some((&res).into()),
    };
    let args = it.into_args();

    let (value, deps) = encode_with(legacy(), args).await;
    assert_eq!(value, json!({"firstArg": "x", "secondArg": "id"}));
    assert_eq!(deps, [res.clone(), res]);
}
