//! Labelled input with its validation messages

use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, Clone, PartialEq)]
pub struct TextFieldProps {
    pub label: AttrValue,
    pub name: AttrValue,
    #[prop_or(AttrValue::Static("text"))]
    pub input_type: AttrValue,
    pub value: AttrValue,
    #[prop_or_default]
    pub errors: Vec<String>,
    #[prop_or_default]
    pub disabled: bool,
    pub oninput: Callback<String>,
}

#[function_component(TextField)]
pub fn text_field(props: &TextFieldProps) -> Html {
    let oninput = {
        let oninput = props.oninput.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            oninput.emit(input.value());
        })
    };

    let id = format!("field-{}", props.name);
    let invalid = !props.errors.is_empty();

    html! {
        <div class={classes!("field", invalid.then_some("field-invalid"))}>
            <label for={id.clone()}>{props.label.clone()}</label>
            <input
                id={id}
                name={props.name.clone()}
                type={props.input_type.clone()}
                value={props.value.clone()}
                disabled={props.disabled}
                aria-invalid={invalid.to_string()}
                {oninput}
            />
            { for props.errors.iter().map(|error| html! {
                <p class="field-error">{error}</p>
            }) }
        </div>
    }
}
