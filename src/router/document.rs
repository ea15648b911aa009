//! Document
//!
//! The mount point views render into. A document is split into regions;
//! mounting new content only replaces the regions whose markup changed and
//! reports them as a [`Patch`].

use serde::Serialize;
use std::collections::BTreeMap;

use crate::html::Html;

/// Independently replaceable part of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Header,
    Main,
    Footer,
    Toast,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Header, Region::Main, Region::Footer, Region::Toast];

    /// Element id of the region in the page
    pub fn id(self) -> &'static str {
        match self {
            Region::Header => "header",
            Region::Main => "main",
            Region::Footer => "footer",
            Region::Toast => "toast",
        }
    }
}

/// Changes produced by one mount
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Patch {
    pub title: String,
    pub title_changed: bool,
    pub regions: BTreeMap<Region, Html>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        !self.title_changed && self.regions.is_empty()
    }

    pub fn changed(&self, region: Region) -> bool {
        self.regions.contains_key(&region)
    }
}

/// Rendered page state
#[derive(Debug, Clone, Default)]
pub struct Document {
    title: String,
    lang: String,
    regions: BTreeMap<Region, Html>,
    mounts: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn region(&self, region: Region) -> Option<&Html> {
        self.regions.get(&region)
    }

    /// Number of mounts so far
    pub fn mounts(&self) -> u64 {
        self.mounts
    }

    pub fn set_lang(&mut self, lang: &str) {
        self.lang = lang.to_string();
    }

    /// Replace the page content, keeping unchanged regions
    pub fn mount(&mut self, title: &str, content: Vec<(Region, Html)>) -> Patch {
        let mut patch = Patch {
            title: title.to_string(),
            title_changed: self.title != title,
            regions: BTreeMap::new(),
        };
        self.title = title.to_string();

        for (region, html) in content {
            if self.regions.get(&region) != Some(&html) {
                patch.regions.insert(region, html.clone());
                self.regions.insert(region, html);
            }
        }

        self.mounts += 1;
        tracing::debug!(
            title,
            changed = patch.regions.len(),
            mounts = self.mounts,
            "Document mounted"
        );
        patch
    }

    /// Full HTML page for a browser
    pub fn to_html(&self) -> String {
        let region = |r: Region| self.regions.get(&r).cloned().unwrap_or_default();
        let lang = if self.lang.is_empty() { "de" } else { self.lang.as_str() };

        crate::html!(
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{}</title>\n<link rel=\"stylesheet\" href=\"/css/style.css\">\n</head>\n<body>\n\
             <header id=\"header\">{}</header>\n<main id=\"main\">{}</main>\n\
             <footer id=\"footer\">{}</footer>\n<div id=\"toast\">{}</div>\n\
             <script>{}</script>\n</body>\n</html>\n",
            lang,
            self.title,
            region(Region::Header),
            region(Region::Main),
            region(Region::Footer),
            region(Region::Toast),
            Html::trusted(DELEGATE_SCRIPT)
        )
        .into_string()
    }
}

/// Forwards `data-action` events and link clicks to the shell and applies
/// the returned region patch.
const DELEGATE_SCRIPT: &str = r#"
(function () {
  function collect(el) {
    var data = {};
    for (var key in el.dataset) { if (key !== 'action') data[key] = el.dataset[key]; }
    return data;
  }
  function apply(res) {
    var patch = res.patch || {};
    if (patch.title) document.title = patch.title;
    Object.keys(patch.regions || {}).forEach(function (id) {
      var el = document.getElementById(id);
      if (el) el.innerHTML = patch.regions[id];
    });
    if (res.history === 'back') { history.back(); return; }
    if (res.history === 'forward') { history.forward(); return; }
    if (!res.path || res.path === location.pathname + location.search) return;
    if (res.history === 'push') history.pushState({}, '', res.path);
    else if (res.history === 'replace') history.replaceState({}, '', res.path);
  }
  function send(action, data, form) {
    fetch('/_action', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ action: action, data: data || {}, form: form || {},
                             path: location.pathname + location.search })
    }).then(function (r) { return r.json(); }).then(apply);
  }
  document.addEventListener('click', function (ev) {
    var el = ev.target.closest('[data-action]');
    if (el && el.tagName !== 'FORM') {
      ev.preventDefault();
      send(el.dataset.action, collect(el));
      return;
    }
    var link = ev.target.closest('a[data-link]');
    if (link) {
      ev.preventDefault();
      send('navigate', { path: link.getAttribute('href') });
    }
  });
  document.addEventListener('change', function (ev) {
    var el = ev.target.closest('[data-change]');
    if (el) send(el.dataset.change, Object.assign(collect(el), { value: el.value }));
  });
  document.addEventListener('submit', function (ev) {
    var form = ev.target.closest('form[data-action]');
    if (!form) return;
    ev.preventDefault();
    var fields = {};
    new FormData(form).forEach(function (v, k) { fields[k] = String(v); });
    send(form.dataset.action, collect(form), fields);
  });
  window.addEventListener('popstate', function () {
    send('popstate', { path: location.pathname + location.search });
  });
})();
"#;
