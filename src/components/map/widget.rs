// Leaflet glue. The page loads Leaflet itself; if `L` is missing the map
// panel degrades to a notice and the rest of the tour keeps working.
use super::{MapError, MapSnapshot};
use std::cell::RefCell;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::Closure, JsValue};

pub const MAP_CONTAINER_ID: &str = "audiotour-map";
#[cfg(target_arch = "wasm32")]
const MARKER_CLICK_GLOBAL: &str = "__audiotourMarkerClick";

#[cfg(target_arch = "wasm32")]
type MarkerClickHandler = Closure<dyn FnMut(String)>;
#[cfg(not(target_arch = "wasm32"))]
type MarkerClickHandler = Box<dyn FnMut(String)>;

thread_local! {
    // The one live marker-click handler. Replacing it drops the previous one.
    static MARKER_CLICK: RefCell<Option<MarkerClickHandler>> = const { RefCell::new(None) };
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
const MAP_BRIDGE_JS: &str = r##"
(() => {
  if (window.__audiotourMap) {
    return true;
  }
  if (typeof L === "undefined") {
    return false;
  }

  window.__audiotourMap = {
    map: null,
    layer: null,
    viewRevision: null,

    sync(containerId, s) {
      const el = document.getElementById(containerId);
      if (!el) {
        return false;
      }
      if (!this.map || this.map.getContainer() !== el) {
        if (this.map) {
          this.map.remove();
        }
        this.map = L.map(el);
        L.tileLayer(s.tile_url, { attribution: s.attribution, maxZoom: 19 }).addTo(this.map);
        this.layer = L.layerGroup().addTo(this.map);
        this.viewRevision = null;
      }

      this.layer.clearLayers();
      for (const m of s.markers) {
        const active = m.id === s.highlighted;
        const marker = L.circleMarker([m.position.latitude, m.position.longitude], {
          radius: active ? 12 : 8,
          color: active ? "#b3541e" : "#2f4858",
          fillOpacity: 0.85,
        });
        marker.bindTooltip(`${m.order}. ${m.title}`);
        marker.on("click", () => {
          if (window.__audiotourMarkerClick) {
            window.__audiotourMarkerClick(m.id);
          }
        });
        marker.addTo(this.layer);
      }

      if (s.view_revision !== this.viewRevision) {
        const t = s.target;
        if (t.kind === "focus") {
          const c = [t.center.latitude, t.center.longitude];
          s.animate ? this.map.flyTo(c, t.zoom) : this.map.setView(c, t.zoom);
        } else {
          const b = [[t.bounds.south, t.bounds.west], [t.bounds.north, t.bounds.east]];
          const opts = { padding: [32, 32] };
          s.animate ? this.map.flyToBounds(b, opts) : this.map.fitBounds(b, opts);
        }
        this.viewRevision = s.view_revision;
      }
      return true;
    },
  };
  return true;
})()
"##;

#[cfg(target_arch = "wasm32")]
pub fn ensure_map_bridge() -> Result<(), MapError> {
    match js_sys::eval(MAP_BRIDGE_JS) {
        Ok(value) if value.as_bool() == Some(true) => Ok(()),
        Ok(_) => Err(MapError::WidgetUnavailable(
            "Leaflet is not loaded".to_string(),
        )),
        Err(err) => Err(MapError::WidgetUnavailable(format!("{err:?}"))),
    }
}

#[cfg(target_arch = "wasm32")]
pub fn sync_map(snapshot: &MapSnapshot) -> Result<(), MapError> {
    ensure_map_bridge()?;
    let json = serde_json::to_string(snapshot)
        .map_err(|err| MapError::WidgetUnavailable(err.to_string()))?;
    let script = format!("window.__audiotourMap.sync({MAP_CONTAINER_ID:?}, {json})");
    match js_sys::eval(&script) {
        Ok(value) if value.as_bool() == Some(true) => Ok(()),
        Ok(_) => Err(MapError::WidgetUnavailable(format!(
            "no element with id `{MAP_CONTAINER_ID}`"
        ))),
        Err(err) => Err(MapError::WidgetUnavailable(format!("{err:?}"))),
    }
}

/// Routes Leaflet marker clicks back into Rust. Replaces any earlier handler.
#[cfg(target_arch = "wasm32")]
pub fn install_marker_click_handler(handler: impl FnMut(String) + 'static) -> Result<(), MapError> {
    let window = web_sys::window()
        .ok_or_else(|| MapError::WidgetUnavailable("no window".to_string()))?;
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(String)>);
    js_sys::Reflect::set(
        &JsValue::from(window),
        &JsValue::from_str(MARKER_CLICK_GLOBAL),
        closure.as_ref(),
    )
    .map_err(|err| MapError::WidgetUnavailable(format!("{err:?}")))?;
    MARKER_CLICK.with(|slot| slot.replace(Some(closure)));
    Ok(())
}

/// Detaches the marker-click handler and frees it.
#[cfg(target_arch = "wasm32")]
pub fn remove_marker_click_handler() {
    if let Some(window) = web_sys::window() {
        let _ = js_sys::Reflect::delete_property(&window, &JsValue::from_str(MARKER_CLICK_GLOBAL));
    }
    MARKER_CLICK.with(|slot| slot.take());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_map_bridge() -> Result<(), MapError> {
    Err(MapError::WidgetUnavailable(
        "map widget requires a browser".to_string(),
    ))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn sync_map(_snapshot: &MapSnapshot) -> Result<(), MapError> {
    ensure_map_bridge()
}

/// Without a browser the handler is only held.
#[cfg(not(target_arch = "wasm32"))]
pub fn install_marker_click_handler(
    handler: impl FnMut(String) + 'static,
) -> Result<(), MapError> {
    let handler: MarkerClickHandler = Box::new(handler);
    MARKER_CLICK.with(|slot| slot.replace(Some(handler)));
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove_marker_click_handler() {
    MARKER_CLICK.with(|slot| slot.take());
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn dispatch_marker_click(id: &str) -> bool {
        let handler = MARKER_CLICK.with(|slot| slot.borrow_mut().take());
        let Some(mut handler) = handler else {
            return false;
        };
        handler(id.to_string());
        MARKER_CLICK.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                *slot = Some(handler);
            }
        });
        true
    }

    #[test]
    fn bridge_script_is_complete() {
        let script = MAP_BRIDGE_JS.trim();
        assert!(script.starts_with("(() => {"));
        assert!(script.ends_with("})()"));
        assert!(script.contains(r##"color: active ? "#b3541e" : "#2f4858""##));
        assert!(script.contains("window.__audiotourMarkerClick(m.id)"));
        assert!(script.contains("flyToBounds"));
    }

    #[test]
    fn reinstalling_replaces_and_frees_the_handler() {
        let first_owner = Rc::new(());
        let captured = first_owner.clone();
        install_marker_click_handler(move |_| {
            let _ = &captured;
        })
        .unwrap();
        assert_eq!(Rc::strong_count(&first_owner), 2);

        let clicks = Rc::new(RefCell::new(Vec::new()));
        let seen = clicks.clone();
        install_marker_click_handler(move |id| seen.borrow_mut().push(id)).unwrap();
        assert_eq!(Rc::strong_count(&first_owner), 1);

        assert!(dispatch_marker_click("duomo"));
        assert_eq!(*clicks.borrow(), vec!["duomo".to_string()]);

        remove_marker_click_handler();
        assert!(!dispatch_marker_click("piazza"));
        assert_eq!(Rc::strong_count(&clicks), 1);
    }
}
