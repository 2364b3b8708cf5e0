//! Turning map configurations into widgets.
//!
//! The crate does not draw maps. A [`Renderer`] is whatever the host uses to
//! build a widget from a [`MapConfig`]; [`render_document`] runs the whole
//! pipeline around it. Engines with a live, stateful view object implement
//! [`MapBackend`] instead and are driven by [`MapView`], which owns the view
//! handle and releases it on drop.

use std::future::Future;

use futures::future::join_all;

use crate::config::Config;
use crate::map_config::{LatLng, LayerDescriptor, MapConfig, PortalReference};
use crate::recompose::{Segment, recompose};
use crate::substitute::{DeclarationOutcome, Extractor};

pub mod html;

/// Errors a renderer can report for one map.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The center cannot be shown.
    CoordinateOutOfRange(LatLng),
    /// Fetching the mapping library or service metadata failed.
    Network(String),
    /// The token was missing or rejected.
    Unauthorized(String),
    /// The backend cannot show the requested basemap.
    UnsupportedBasemap(String),
    /// Adding the layer at `index` of `services` failed.
    Layer { index: usize, message: String },
    /// Loading the portal item failed.
    Portal(String),
    /// Any other backend failure.
    Backend(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoordinateOutOfRange(c) => write!(
                f,
                "invalid center ({}, {}): latitude must be within [-90, 90] and longitude within [-180, 180]",
                c.lat, c.lon
            ),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Unauthorized(msg) => write!(f, "not authorized: {}", msg),
            Self::UnsupportedBasemap(name) => write!(f, "unsupported basemap '{}'", name),
            Self::Layer { index, message } => {
                write!(f, "failed to add layer {}: {}", index, message)
            }
            Self::Portal(msg) => write!(f, "failed to load portal item: {}", msg),
            Self::Backend(msg) => write!(f, "map backend error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Builds one widget per map.
pub trait Renderer {
    type Widget;

    fn render(&self, config: &MapConfig)
    -> impl Future<Output = Result<Self::Widget, RenderError>>;
}

/// A rendered document: text and widgets in source order, plus the outcome
/// of every declaration. A map that failed to render is an `Err` in place.
#[derive(Debug)]
pub struct RenderedDocument<W> {
    pub segments: Vec<Segment<Result<W, RenderError>>>,
    pub outcomes: Vec<DeclarationOutcome>,
}

impl<W> RenderedDocument<W> {
    pub fn widgets(&self) -> impl Iterator<Item = &Result<W, RenderError>> {
        self.segments.iter().filter_map(Segment::as_widget)
    }
}

/// Extract maps from `content`, render them concurrently and recompose.
///
/// Parse failures and render failures are per map; neither stops the rest
/// of the document from rendering.
pub async fn render_document<R: Renderer>(
    content: &str,
    config: &Config,
    renderer: &R,
) -> RenderedDocument<R::Widget> {
    let extractor = Extractor::new(config.clone());
    render_with(&extractor, content, renderer).await
}

/// Like [`render_document`], reusing an existing [`Extractor`].
pub async fn render_with<R: Renderer>(
    extractor: &Extractor,
    content: &str,
    renderer: &R,
) -> RenderedDocument<R::Widget> {
    let substitution = extractor.extract(content);

    let widgets = join_all(substitution.configs().map(|c| renderer.render(c))).await;
    for (index, widget) in widgets.iter().enumerate() {
        if let Err(e) = widget {
            log::warn!("Map {} failed to render: {}", index, e);
        }
    }

    let segments = recompose(&substitution, widgets);
    RenderedDocument {
        segments,
        outcomes: substitution.outcomes,
    }
}

/// What a backend needs to create a bare view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec<'a> {
    pub center: LatLng,
    pub zoom: f64,
    pub basemap: &'a str,
    pub height: &'a str,
    pub width: &'a str,
    pub ui: &'a crate::map_config::UiToggles,
    pub token: Option<&'a str>,
}

impl<'a> ViewSpec<'a> {
    fn from_config(config: &'a MapConfig) -> Self {
        Self {
            center: config.center,
            zoom: config.zoom,
            basemap: &config.basemap,
            height: &config.height,
            width: &config.width,
            ui: &config.ui,
            token: config.auth_token.as_deref(),
        }
    }
}

/// A mapping engine with a stateful view object.
pub trait MapBackend {
    type Handle;

    fn create_view(
        &self,
        spec: &ViewSpec<'_>,
    ) -> impl Future<Output = Result<Self::Handle, RenderError>>;

    fn load_portal_item(
        &self,
        handle: &mut Self::Handle,
        portal: &PortalReference,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), RenderError>>;

    /// Add one layer on top of the existing ones.
    fn add_layer(
        &self,
        handle: &mut Self::Handle,
        layer: &LayerDescriptor,
        token: Option<&str>,
    ) -> impl Future<Output = Result<(), RenderError>>;

    /// Tear down the view and everything attached to it.
    fn release(&self, handle: Self::Handle);
}

/// Releases a handle unless defused.
struct HandleGuard<'b, B: MapBackend> {
    backend: &'b B,
    handle: Option<B::Handle>,
}

impl<B: MapBackend> HandleGuard<'_, B> {
    fn handle_mut(&mut self) -> Option<&mut B::Handle> {
        self.handle.as_mut()
    }
}

impl<B: MapBackend> Drop for HandleGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.backend.release(handle);
        }
    }
}

/// A mounted map: the live view for one [`MapConfig`].
///
/// Dropping it releases the view. A config change recreates the view rather
/// than patching it.
pub struct MapView<'b, B: MapBackend> {
    config: MapConfig,
    guard: HandleGuard<'b, B>,
}

impl<'b, B: MapBackend> MapView<'b, B> {
    /// Create the view, load the portal item, then add layers in order.
    ///
    /// Whatever was allocated is released if any step fails, or if this
    /// future is dropped before it completes.
    pub async fn mount(backend: &'b B, config: &MapConfig) -> Result<Self, RenderError> {
        if !config.center.is_valid() {
            return Err(RenderError::CoordinateOutOfRange(config.center));
        }

        let handle = backend.create_view(&ViewSpec::from_config(config)).await?;
        let mut guard = HandleGuard {
            backend,
            handle: Some(handle),
        };
        let token = config.auth_token.as_deref();

        if let Some(portal) = &config.portal
            && let Some(handle) = guard.handle_mut()
        {
            backend.load_portal_item(handle, portal, token).await?;
        }

        for (index, layer) in config.services.iter().enumerate() {
            let Some(handle) = guard.handle_mut() else {
                break;
            };
            backend
                .add_layer(handle, layer, token)
                .await
                .map_err(|e| match e {
                    RenderError::Layer { .. } => e,
                    other => RenderError::Layer {
                        index,
                        message: other.to_string(),
                    },
                })?;
            log::debug!("Added {} layer {}", layer.kind.as_str(), index);
        }

        Ok(Self {
            config: config.clone(),
            guard,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn handle(&self) -> Option<&B::Handle> {
        self.guard.handle.as_ref()
    }

    /// Bring the view in line with `config`.
    ///
    /// An identical config on a live view is a no-op. Otherwise the current
    /// view is released first and a new one mounted; on failure this view is
    /// left empty.
    pub async fn update(&mut self, config: &MapConfig) -> Result<(), RenderError> {
        if *config == self.config && self.guard.handle.is_some() {
            return Ok(());
        }
        log::debug!("Map config changed, recreating view");

        if let Some(handle) = self.guard.handle.take() {
            self.guard.backend.release(handle);
        }
        self.config = config.clone();

        let mounted = Self::mount(self.guard.backend, config).await?;
        *self = mounted;
        Ok(())
    }
}

/// Adapts a [`MapBackend`] into a [`Renderer`] whose widgets are [`MapView`]s.
pub struct BackendRenderer<'b, B> {
    backend: &'b B,
}

impl<'b, B: MapBackend> BackendRenderer<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self { backend }
    }
}

impl<'b, B: MapBackend> Renderer for BackendRenderer<'b, B> {
    type Widget = MapView<'b, B>;

    async fn render(&self, config: &MapConfig) -> Result<Self::Widget, RenderError> {
        MapView::mount(self.backend, config).await
    }
}
