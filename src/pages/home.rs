use leptos::prelude::*;
use log::warn;

use crate::components::graph_view::{GraphCanvas, SignalPresenter, severity_class};
use crate::engine::layout::rand_simple;
use crate::engine::annotations::UnknownMode;
use crate::engine::{ElementTypeFilter, GraphStats, LabelMode, LayoutAlgorithm, RawElement};

const NODE_TYPES: &[&str] = &["person", "company", "project"];
const EDGE_TYPES: &[&str] = &["works_at", "owns", "collaborates"];
const FIRST_NAMES: &[&str] = &[
	"Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Frances", "John", "Margaret", "Ken",
];

/// Generate a sample graph (random tree with typed nodes and edges).
fn generate_sample_elements(n: usize) -> Vec<RawElement> {
	let nodes = (0..n).map(|i| {
		let kind = NODE_TYPES[i % NODE_TYPES.len()];
		let label = match kind {
			"person" => format!("{} {}", FIRST_NAMES[i % FIRST_NAMES.len()], i),
			"company" => format!("Company {i}"),
			_ => format!("Project {i}"),
		};
		RawElement::node(format!("n{i}"), label)
			.with_field("type", kind)
			.with_field("description", format!("Sample {kind} #{i}"))
	});

	let edges = (1..n).map(|i| {
		let target = (rand_simple(i) * (i as f64)) as usize;
		let kind = EDGE_TYPES[(rand_simple(i * 7) * EDGE_TYPES.len() as f64) as usize % EDGE_TYPES.len()];
		RawElement::edge(format!("e{i}"), format!("n{i}"), format!("n{target}"), kind)
	});

	nodes.chain(edges).collect()
}

/// Parse a select value, falling back to the default on unknown options.
fn parse_mode<T>(value: &str) -> T
where
	T: std::str::FromStr<Err = UnknownMode> + Default,
{
	value.parse().unwrap_or_else(|err: UnknownMode| {
		warn!("{err}, using default");
		T::default()
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let size = RwSignal::new(60usize);
	let elements = Signal::derive(move || generate_sample_elements(size.get()));
	let search = RwSignal::new(String::new());
	let element_type = RwSignal::new(ElementTypeFilter::All);
	let edge_type = RwSignal::new("All".to_string());
	let label_mode = RwSignal::new(LabelMode::All);
	let layout = RwSignal::new(LayoutAlgorithm::default().name().to_string());
	let stats = RwSignal::new(GraphStats::default());
	let export_requests = RwSignal::new(0u32);
	let presenter = SignalPresenter::new();

	let toast = move || {
		presenter.toast.get().map(|toast| {
			view! {
				<div class={severity_class(toast.severity)} on:click=move |_| presenter.toast.set(None)>
					{toast.text}
				</div>
			}
		})
	};

	let panel = move || {
		presenter.panel.get().map(|panel| {
			let rows = panel
				.rows
				.into_iter()
				.map(|(key, value)| view! { <tr><th>{key}</th><td>{value}</td></tr> })
				.collect_view();
			view! {
				<div class="info-panel">
					<h2>{panel.title}</h2>
					<table>{rows}</table>
					<button on:click=move |_| presenter.panel.set(None)>"Close"</button>
				</div>
			}
		})
	};

	let exported = move || {
		presenter.exported.get().map(|json| {
			view! {
				<div class="info-panel export-panel">
					<h2>"Exported graph"</h2>
					<pre>{json}</pre>
					<button on:click=move |_| presenter.exported.set(None)>"Close"</button>
				</div>
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
				<GraphCanvas
					elements=elements
					search=search
					element_type=element_type
					edge_type=edge_type
					label_mode=label_mode
					layout=layout
					presenter=presenter
					stats=stats
					export_requests=export_requests
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Annotated Graph"</h1>
					<p class="subtitle">
						"Click to select. Right-click for actions. Drag nodes to reposition. Scroll to zoom."
					</p>

					<input
						type="search"
						placeholder="Search labels, names, descriptions..."
						prop:value=move || search.get()
						on:input=move |ev| search.set(event_target_value(&ev))
					/>

					<select on:change=move |ev| element_type.set(parse_mode(&event_target_value(&ev)))>
						<option value="all">"All elements"</option>
						<option value="nodes">"Nodes only"</option>
						<option value="edges">"Edges only"</option>
					</select>

					<select on:change=move |ev| edge_type.set(event_target_value(&ev))>
						<option value="All">"All edge types"</option>
						{EDGE_TYPES
							.iter()
							.map(|t| view! { <option value={*t}>{*t}</option> })
							.collect_view()}
					</select>

					<select on:change=move |ev| label_mode.set(parse_mode(&event_target_value(&ev)))>
						<option value="all">"All labels"</option>
						<option value="nodes">"Node labels"</option>
						<option value="edges">"Edge labels"</option>
						<option value="none">"No labels"</option>
					</select>

					<select on:change=move |ev| layout.set(event_target_value(&ev))>
						{LayoutAlgorithm::ALL
							.iter()
							.map(|a| {
								let name = a.name();
								view! { <option value=name selected={*a == LayoutAlgorithm::default()}>{name}</option> }
							})
							.collect_view()}
					</select>

					<button on:click=move |_| size.update(|n| *n = if *n == 60 { 90 } else { 60 })>
						"Swap dataset"
					</button>
					<button on:click=move |_| export_requests.update(|n| *n += 1)>"Export JSON"</button>

					<p class="stats">
						{move || {
							let s = stats.get();
							format!(
								"{} nodes, {} edges, {} components, average degree {}",
								s.node_count,
								s.edge_count,
								s.connected_components,
								s.average_degree_display()
							)
						}}
					</p>
				</div>
				{toast}
				{panel}
				{exported}
			</div>
		</ErrorBoundary>
	}
}
