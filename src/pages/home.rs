use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::components::radical_graph::{
	GraphCommand, RadicalGraphCanvas, ReferenceData, SelectedEntry,
};

const SAMPLE_KRADFILE: &str = include_str!("../../data/sample_kradfile.txt");
const START: &str = "亜";

/// Radical explorer: search a kanji, then grow the graph around it.
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::stored(ReferenceData::from_kradfile(SAMPLE_KRADFILE));
	let (command, set_command) = signal(Some(GraphCommand::Search(START.to_owned())));
	let (query, set_query) = signal(START.to_owned());
	let (selected, set_selected) = signal(None::<SelectedEntry>);
	let (notice, set_notice) = signal(None::<String>);

	let on_select = Callback::new(move |entry: Option<SelectedEntry>| set_selected.set(entry));
	let on_notice = Callback::new(move |message: String| set_notice.set(Some(message)));

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let id = query.get_untracked().trim().to_owned();
		if id.is_empty() {
			return;
		}
		set_notice.set(None);
		set_command.set(Some(GraphCommand::Search(id)));
	};

	let details = move || {
		selected.get().map(|entry| {
			let (root_id, hide_id, collapse_id) =
				(entry.id.clone(), entry.id.clone(), entry.id.clone());
			view! {
				<aside class="graph-details">
					<h2>{entry.id.clone()}</h2>
					<ul class="radicals">
						{entry
							.components
							.into_iter()
							.map(|c| view! { <li>{c}</li> })
							.collect_view()}
					</ul>
					<div class="actions">
						<button on:click=move |_| {
							set_command.set(Some(GraphCommand::Search(root_id.clone())))
						}>"Make root"</button>
						<button on:click=move |_| {
							set_command.set(Some(GraphCommand::Collapse(collapse_id.clone())))
						}>"Collapse"</button>
						<button on:click=move |_| {
							set_command.set(Some(GraphCommand::Hide(hide_id.clone())))
						}>"Hide"</button>
					</div>
				</aside>
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<RadicalGraphCanvas
					data=graph_data
					command=command
					on_select=on_select
					on_notice=on_notice
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Radical Graph"</h1>
					<p class="subtitle">
						"Hover to peek at neighbors. Click a faded kanji to expand it. Drag background to pan, scroll to zoom."
					</p>
					<form on:submit=on_submit>
						<input
							type="text"
							placeholder="Kanji"
							prop:value=move || query.get()
							on:input=move |ev| set_query.set(event_target_value(&ev))
						/>
						<button type="submit">"Search"</button>
					</form>
					{move || notice.get().map(|message| view! { <p class="notice">{message}</p> })}
				</div>
				{details}
			</div>
		</ErrorBoundary>
	}
}
