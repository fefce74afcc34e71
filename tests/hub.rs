mod common;

use chrono::{Duration, Local};
use common::{TestProvider, JOKE};
use serde_json::{json, Value};
use std::sync::Arc;
use toolhub::builtin::BuiltinProvider;
use toolhub::config::HubLimits;
use toolhub::error::{CallError, HubError};
use toolhub::function::{FunctionOrigin, ReturnSpec, ValueType};
use toolhub::types::ToolCall;
use toolhub::{AuthContext, Function, FunctionCollection, FunctionSpec, Hub, Provider, Registry, RegistryFilter};

fn hub() -> Hub {
    let providers: Vec<Box<dyn Provider>> = vec![Box::new(BuiltinProvider::new()), Box::new(TestProvider::new())];
    Hub::new(Registry::new(&providers, &RegistryFilter::default()))
}

fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall::new(id, name, arguments.to_string())
}

#[test]
fn batch_reports_failures_in_place() {
    let hub = hub();
    let outcomes = hub
        .call_tools(
            &AuthContext::anonymous(),
            &[
                call("a", "random_string", json!({"length": 12})),
                call("b", "no_such_function", json!({})),
                call("c", "random_string", json!({"length": 3, "charset": "x"})),
            ],
        )
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    let ids: Vec<&str> = outcomes.iter().map(|o| o.tool_call_id()).collect();
    assert_eq!(ids, ["a", "b", "c"]);

    assert_eq!(outcomes[0].output().unwrap().chars().count(), 12);
    assert_eq!(
        outcomes[1].errors(),
        [CallError::UnknownFunction("no_such_function".into())]
    );
    assert_eq!(outcomes[2].output(), Some("xxx"));
}

#[test]
fn missing_required_argument_is_the_only_error() {
    let hub = hub();
    let outcome = hub.call_tool(&AuthContext::anonymous(), &call("x", "random_string", json!({})));
    assert_eq!(outcome.errors(), [CallError::MissingParameter("length".into())]);
}

#[test]
fn all_argument_errors_are_reported_together() {
    let hub = hub();
    let outcome = hub.call_tool(
        &AuthContext::anonymous(),
        &call("x", "foodhub_review", json!({"restaurant": "Palateria"})),
    );
    assert_eq!(outcome.errors().len(), 1);
    assert_eq!(outcome.errors()[0].kind(), "parameter_type");

    let outcome = hub.call_tool(&AuthContext::anonymous(), &ToolCall::new("y", "random_string", "not json"));
    assert!(matches!(outcome.errors(), [CallError::MalformedArguments(_)]));
}

#[test]
fn record_arguments_reach_the_function() {
    let hub = hub();
    let auth = AuthContext::anonymous();
    let outcome = hub.call_tool(
        &auth,
        &call(
            "r1",
            "foodhub_review",
            json!({"restaurant": {"name": "Palateria Los Manguitos", "location": "Redwood City"}}),
        ),
    );
    assert_eq!(outcome.output(), Some("Delightful!"));

    let outcome = hub.call_tool(
        &auth,
        &call("r2", "foodhub_review", json!({"restaurant": {"name": "Elsewhere", "location": "Oakland"}})),
    );
    assert_eq!(outcome.output(), Some("null"));

    let outcome = hub.call_tool(&auth, &call("r3", "foodhub_review", json!({"restaurant": {"name": "Elsewhere"}})));
    assert!(matches!(outcome.errors(), [CallError::ParameterType { name, .. }] if name == "restaurant"));
}

#[test]
fn date_arguments_are_parsed() {
    let hub = hub();
    let auth = AuthContext::anonymous();
    let tomorrow = (Local::now().date_naive() + Duration::days(1)).format("%Y-%m-%d").to_string();

    let outcome = hub.call_tool(&auth, &call("d1", "joke_of_the_day", json!({"joke_date": tomorrow})));
    assert_eq!(outcome.output(), Some(JOKE));

    let outcome = hub.call_tool(&auth, &call("d2", "joke_of_the_day", json!({"joke_date": "2001-01-01"})));
    assert_eq!(outcome.output(), Some("Forgot the joke!"));

    let outcome = hub.call_tool(&auth, &call("d3", "quote_of_the_day", json!({"quote_date": "yesterday"})));
    assert_eq!(outcome.errors()[0].kind(), "parameter_type");
}

fn echo_provider(count: usize, result: Value) -> Box<dyn Provider> {
    struct Echo {
        functions: Vec<Arc<Function>>,
    }
    impl Provider for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn functions(&self) -> &[Arc<Function>] {
            &self.functions
        }
        fn collections(&self) -> &[FunctionCollection] {
            &[]
        }
    }

    let functions = (0..count)
        .map(|i| {
            let spec = FunctionSpec::new(
                format!("echo_{}", i),
                vec![toolhub::function::ParameterSpec::new("n", ValueType::Integer, "A number", false)],
                ReturnSpec::new(ValueType::String, "The number"),
                None,
            )
            .unwrap();
            let result = result.clone();
            Arc::new(Function::new(spec, FunctionOrigin::Builtin, move |_: &AuthContext, args: &toolhub::function::Arguments| {
                Ok::<_, CallError>(match args.get("n") {
                    Some(n) => n.to_json(),
                    None => result.clone(),
                })
            }))
        })
        .collect();
    Box::new(Echo { functions })
}

#[test]
fn integers_round_trip_as_text() {
    let hub = Hub::new(Registry::new(&[echo_provider(1, Value::Null)], &RegistryFilter::default()));
    let outcome = hub.call_tool(&AuthContext::anonymous(), &call("i", "echo_0", json!({"n": 100})));
    assert_eq!(outcome.output(), Some("100"));

    let outcome = hub.call_tool(&AuthContext::anonymous(), &call("s", "echo_0", json!({"n": "100"})));
    assert_eq!(outcome.output(), Some("100"));
}

#[test]
fn long_outputs_are_truncated() {
    let hub = Hub::new(Registry::new(
        &[echo_provider(1, json!("y".repeat(1500)))],
        &RegistryFilter::default(),
    ));
    let outcome = hub.call_tool(&AuthContext::anonymous(), &call("t", "echo_0", json!({})));
    let output = outcome.output().unwrap();
    assert!(output.starts_with(&"y".repeat(1024)));
    assert!(output.ends_with("... 476 characters omitted"));

    let hub = hub.with_limits(HubLimits {
        max_tools: 127,
        max_result_length: 10,
    });
    let outcome = hub.call_tool(&AuthContext::anonymous(), &call("t", "echo_0", json!({})));
    assert_eq!(outcome.output(), Some("yyyyyyyyyy... 1490 characters omitted"));
}

#[test]
fn tool_spec_refuses_too_many_tools() {
    let hub = Hub::new(Registry::new(&[echo_provider(130, Value::Null)], &RegistryFilter::default()));
    assert_eq!(
        hub.tools_spec().unwrap_err(),
        HubError::TooManyTools { count: 130, max: 127 }
    );

    let hub = Hub::new(Registry::new(&[echo_provider(127, Value::Null)], &RegistryFilter::default()));
    assert_eq!(hub.tools_spec().unwrap().len(), 127);
}

#[test]
fn tool_spec_lists_every_function() {
    let tools = hub().tools_spec().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.function.name.as_str()).collect();
    assert_eq!(
        names,
        ["random_string", "joke_of_the_day", "quote_of_the_day", "foodhub_review"]
    );

    let joke = serde_json::to_value(&tools[1]).unwrap();
    assert_eq!(joke["type"], "function");
    assert_eq!(
        joke["function"]["description"],
        "Tell the joke of the day. Returns: The joke of the day"
    );
    assert_eq!(
        joke["function"]["parameters"]["properties"]["joke_date"],
        json!({"type": "string", "format": "date", "description": "The date. This parameter is required."})
    );
    assert_eq!(joke["function"]["parameters"]["required"], json!(["joke_date"]));
}
