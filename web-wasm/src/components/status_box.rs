//! ステータス表示コンポーネント

use leptos::prelude::*;
use crate::state::StatusSignal;

/// パネルのステータス欄（None なら何も表示しない）
#[component]
pub fn StatusBox(status: StatusSignal) -> impl IntoView {
    view! {
        {move || {
            status
                .get()
                .map(|message| {
                    view! { <div class=message.kind.class()>{message.text}</div> }
                })
        }}
    }
}
