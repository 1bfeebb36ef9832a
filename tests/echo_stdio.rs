//! Integration tests for the echo_stdio demo.
//!
//! These tests run the demo binary, feed JSON-RPC messages through stdin and
//! check the NDJSON written to stdout.
//!
//! Run test:
//!
//! ```shell
//! cargo test --test echo_stdio
//! ```

pub mod common;

#[cfg(test)]
mod tests {
    use super::common;
    use assert_cmd::Command;
    use serde_json::{Value, json};

    /// Send the given stdin to the demo and return its stdout lines.
    fn run_echo(input: &str) -> Vec<String> {
        let binary_path = common::get_demo_path("echo_stdio").unwrap();

        let output = Command::new(&binary_path)
            .env("RUST_LOG", "warn")
            .write_stdin(input)
            .output()
            .expect("Failed to execute echo_stdio");

        assert!(output.status.success());
        String::from_utf8(output.stdout)
            .expect("Response is not valid UTF-8")
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn parse(line: &str) -> Value {
        serde_json::from_str(line).expect("Response is not valid JSON")
    }

    #[test]
    fn echo_string() {
        let request = json!({
            "jsonrpc": "2.0",
            "method": "echo",
            "params": ["hello world"],
            "id": 1
        })
        .to_string();

        let lines = run_echo(&format!("{request}\n"));
        assert_eq!(
            lines,
            vec![r#"{"jsonrpc":"2.0","result":["hello world"],"id":1}"#.to_string()]
        );
    }

    #[test]
    fn primitive_params_are_invalid() {
        let lines = run_echo(r#"{"jsonrpc":"2.0","method":"echo","params":"hello world","id":1}"#);
        assert_eq!(
            lines,
            vec![
                r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid params"},"id":1}"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn echo_object() {
        let request = json!({
            "jsonrpc": "2.0",
            "method": "echo",
            "params": {"message": "hello", "count": 42},
            "id": "abc"
        })
        .to_string();

        let lines = run_echo(&request);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            parse(&lines[0]),
            json!({"jsonrpc": "2.0", "result": {"message": "hello", "count": 42}, "id": "abc"})
        );
    }

    #[test]
    fn one_line_per_reply() {
        let input = [
            r#"{"jsonrpc":"2.0","method":"ping","id":1}"#,
            "",
            r#"{"jsonrpc":"2.0","method":"log","params":["quiet"]}"#,
            r#"{"jsonrpc":"2.0","method":"add","params":[2,3],"id":2}"#,
        ]
        .join("\n");

        let lines = run_echo(&input);
        assert_eq!(
            lines,
            vec![
                r#"{"jsonrpc":"2.0","result":"pong","id":1}"#.to_string(),
                r#"{"jsonrpc":"2.0","result":5,"id":2}"#.to_string(),
            ]
        );
    }

    #[test]
    fn malformed_json_gets_parse_error() {
        let lines = run_echo("{\"jsonrpc\": \"2.0\", \"method\": \"echo\", \"params\"\n");
        assert_eq!(
            lines,
            vec![
                r#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"Parse error"},"id":null}"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn batch_on_one_line() {
        let batch = json!([
            {"jsonrpc": "2.0", "method": "add", "params": [1, 2], "id": "1"},
            {"jsonrpc": "2.0", "method": "log", "params": ["dropped"]},
            {"jsonrpc": "2.0", "method": "nope", "id": "2"}
        ])
        .to_string();

        let lines = run_echo(&batch);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            parse(&lines[0]),
            json!([
                {"jsonrpc": "2.0", "result": 3, "id": "1"},
                {"jsonrpc": "2.0", "error": {"code": -32601, "message": "Method not found"}, "id": "2"}
            ])
        );
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let entry = json!({"jsonrpc": "2.0", "method": "ping", "id": 1});
        let batch = Value::Array(vec![entry; 11]).to_string();

        let lines = run_echo(&batch);
        assert_eq!(lines.len(), 1);
        let reply = parse(&lines[0]);
        assert_eq!(reply["error"]["code"], json!(-32600));
        assert_eq!(reply["id"], Value::Null);
    }

    #[test]
    fn error_data_is_not_exposed() {
        let lines = run_echo(r#"{"jsonrpc":"2.0","method":"fail","id":7}"#);
        assert_eq!(
            lines,
            vec![
                r#"{"jsonrpc":"2.0","error":{"code":-32001,"message":"Requested failure"},"id":7}"#
                    .to_string()
            ]
        );
    }
}
