//! # Panel Module
//!
//! Interaction logic for the control surface: one widget per function,
//! each a small state machine deciding what value to publish on
//! activation. Rendering lives in the embedding front-end; this module
//! only supplies the behavior behind the buttons.

pub mod widget;

pub use widget::{FunctionWidget, WidgetError};

use crate::config::model::Endpoint;

/// Builds the widget row for one endpoint, in function order.
///
/// Fresh widgets every call: toggles start off and held values start
/// empty, matching a panel rebuild.
pub fn widgets_for(endpoint: &Endpoint) -> Vec<FunctionWidget> {
    endpoint
        .functions
        .iter()
        .cloned()
        .map(FunctionWidget::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{Function, FunctionKind};

    #[test]
    fn widgets_follow_function_order() {
        let endpoint = Endpoint {
            name: "Main".to_string(),
            identifier: "dev1".to_string(),
            functions: vec![
                Function {
                    name: "Lamp".to_string(),
                    topic_suffix: "lamp/set".to_string(),
                    auth_token: String::new(),
                    kind: FunctionKind::Push {
                        value: "on".to_string(),
                    },
                },
                Function {
                    name: "Fan".to_string(),
                    topic_suffix: "fan/set".to_string(),
                    auth_token: String::new(),
                    kind: FunctionKind::Toggle {
                        on_value: "1".to_string(),
                        off_value: "0".to_string(),
                    },
                },
            ],
        };

        let widgets = widgets_for(&endpoint);
        let names: Vec<&str> = widgets.iter().map(|w| w.function().name.as_str()).collect();
        assert_eq!(names, ["Lamp", "Fan"]);
        assert_eq!(widgets[1].is_on(), Some(false));
    }
}
