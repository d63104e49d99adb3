use serde::{Deserialize, Serialize};

/// Message sent from narabe to a layout engine, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutMessage {
    Layout {
        width: u32,
        height: u32,
        windows: Vec<u32>,
    },
    Command {
        cmd: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Reply from a layout engine, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutResult {
    Ok,
    Layout { windows: Vec<WindowGeometry> },
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_message_wire_format() {
        let msg = LayoutMessage::Layout {
            width: 1000,
            height: 800,
            windows: vec![1, 2],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"layout","width":1000,"height":800,"windows":[1,2]}"#
        );
    }

    #[test]
    fn test_command_args_default_to_empty() {
        let msg: LayoutMessage = serde_json::from_str(r#"{"type":"command","cmd":"inc-rows"}"#)
            .unwrap();
        assert_eq!(
            msg,
            LayoutMessage::Command {
                cmd: "inc-rows".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_layout_result_error_parses() {
        let result: LayoutResult =
            serde_json::from_str(r#"{"type":"error","message":"unknown command: foo"}"#).unwrap();
        assert!(matches!(result, LayoutResult::Error { message } if message == "unknown command: foo"));
    }
}
