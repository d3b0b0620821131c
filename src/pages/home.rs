use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use crate::bridge::{install_update_entry_point, WindowBridge};
use crate::components::force_graph::{ForceGraphCanvas, GraphHandle};
use crate::config::ViewerConfig;
use crate::controller::ViewController;
use crate::graph::NodeId;
use crate::loader::fetch_dataset;

/// Runs controller operations and mirrors the resulting status into the page.
#[derive(Clone)]
struct Session {
	controller: Rc<RefCell<ViewController<GraphHandle>>>,
	status: RwSignal<String>,
}

impl Session {
	fn apply(&self, op: impl FnOnce(&mut ViewController<GraphHandle>)) {
		let status = {
			let mut controller = self.controller.borrow_mut();
			op(&mut controller);
			controller.status().to_string()
		};
		self.status.set(status);
	}
}

/// The graph viewer: canvas plus fit, minimum-weight and search controls.
#[component]
pub fn Home() -> impl IntoView {
	let config = ViewerConfig::from_window();
	let handle = GraphHandle::new(config.background.clone());
	let controller = ViewController::new(handle.clone(), &config).with_bridge(WindowBridge::new(
		config.bridge_object.clone(),
		config.bridge_method.clone(),
	));
	let status = RwSignal::new(controller.status().to_string());
	let session = Session {
		controller: Rc::new(RefCell::new(controller)),
		status,
	};
	let min_weight = RwSignal::new(0.0_f64);

	let live = session.clone();
	if let Err(e) = install_update_entry_point(&config.update_entry_point, move |data| {
		live.apply(|c| c.update(data));
	}) {
		log::warn!("Live updates disabled: {}", e);
	}

	let loading = session.clone();
	let url = config.data_url.clone();
	wasm_bindgen_futures::spawn_local(async move {
		let result = fetch_dataset(&url).await;
		loading.apply(|c| c.finish_load(result));
	});

	let clicks = session.clone();
	let on_node_click: Rc<dyn Fn(NodeId)> = Rc::new(move |id: NodeId| {
		clicks.apply(|c| c.node_clicked(&id));
	});

	let fit = session.clone();
	let on_fit = move |_: web_sys::MouseEvent| fit.apply(|c| c.fit());

	let filter = session.clone();
	let on_min_weight = move |ev: web_sys::Event| {
		let value = event_target_value(&ev).trim().parse::<f64>().unwrap_or(0.0);
		min_weight.set(value);
		filter.apply(|c| c.set_min_weight(value));
	};

	let search = session.clone();
	let on_search = move |ev: web_sys::Event| {
		let query = event_target_value(&ev);
		search.apply(|c| {
			c.search(&query);
		});
	};

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas handle=handle on_node_click=on_node_click fullscreen=true />
			<div class="graph-overlay">
				<h1>"RavenEye"</h1>
				<div class="graph-controls">
					<button on:click=on_fit>"Fit"</button>
					<label>
						"Min weight "
						<input
							type="range"
							min="0"
							max=config.max_weight.to_string()
							step="0.5"
							prop:value=move || min_weight.get().to_string()
							on:input=on_min_weight
						/>
						<span class="weight-value">{move || min_weight.get()}</span>
					</label>
					<input type="search" placeholder="Search id or name" on:change=on_search />
				</div>
				<p class="status">{move || format!("Status: {}", status.get())}</p>
			</div>
		</div>
	}
}
