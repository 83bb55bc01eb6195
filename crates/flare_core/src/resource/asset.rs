//! # Resources
//!
//! A resource is an object with a load/unload lifecycle. The lifecycle
//! bookkeeping lives in [`Resource`]; the actual I/O is delegated to an
//! [`Asset`] implementation.

use std::error::Error;

use crate::error::{CoreError, CoreResult};
use crate::object::ObjectClass;

/// Loader for one kind of asset.
///
/// # Example
///
/// ```rust
/// use std::error::Error;
/// use flare_core::resource::Asset;
///
/// #[derive(Default)]
/// struct Sound {
///     samples: Vec<i16>,
/// }
///
/// impl Asset for Sound {
///     const CLASS_NAME: &'static str = "Sound";
///
///     fn load(&mut self, _path: &str) -> Result<usize, Box<dyn Error>> {
///         self.samples = vec![0; 4410];
///         Ok(self.samples.len() * 2)
///     }
///
///     fn unload(&mut self) {
///         self.samples = Vec::new();
///     }
/// }
/// ```
pub trait Asset: Default + 'static {
    /// Class name reported by resources of this asset kind.
    const CLASS_NAME: &'static str;

    /// Reads the asset from `path`.
    ///
    /// Returns the estimated memory held by the loaded asset in bytes.
    ///
    /// # Errors
    ///
    /// Any I/O or decoding failure. The resource stays unloaded.
    fn load(&mut self, path: &str) -> Result<usize, Box<dyn Error>>;

    /// Releases whatever [`Asset::load`] acquired.
    fn unload(&mut self) {}
}

/// An asset plus its load state.
///
/// Unloading is idempotent, and a resource that is torn down while still
/// loaded is unloaded first.
#[derive(Debug, Default)]
pub struct Resource<A: Asset> {
    path: String,
    loaded: bool,
    memory_usage: usize,
    asset: A,
}

impl<A: Asset> Resource<A> {
    /// Creates an unloaded resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the asset from `path`, unloading the current one first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResourceLoad`] if the asset fails to load. The
    /// path is still recorded and the resource stays unloaded.
    pub fn load(&mut self, path: &str) -> CoreResult<()> {
        self.unload();
        path.clone_into(&mut self.path);

        match self.asset.load(path) {
            Ok(bytes) => {
                self.loaded = true;
                self.memory_usage = bytes;
                tracing::debug!(path, class = A::CLASS_NAME, bytes, "resource loaded");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path, class = A::CLASS_NAME, error = %err, "resource failed to load");
                Err(CoreError::ResourceLoad {
                    path: path.to_owned(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Releases the asset. Does nothing if not loaded.
    pub fn unload(&mut self) {
        if !self.loaded {
            return;
        }

        self.asset.unload();
        self.loaded = false;
        self.memory_usage = 0;
        tracing::debug!(path = %self.path, class = A::CLASS_NAME, "resource unloaded");
    }

    /// Path of the last load attempt, empty if never loaded.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true while the asset is loaded.
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Estimated bytes held by the loaded asset, 0 when unloaded.
    #[inline]
    #[must_use]
    pub const fn memory_usage(&self) -> usize {
        self.memory_usage
    }

    /// Borrows the asset.
    #[inline]
    #[must_use]
    pub const fn asset(&self) -> &A {
        &self.asset
    }

    /// Mutably borrows the asset.
    #[inline]
    pub fn asset_mut(&mut self) -> &mut A {
        &mut self.asset
    }
}

impl<A: Asset> ObjectClass for Resource<A> {
    fn class_name(&self) -> &'static str {
        A::CLASS_NAME
    }

    fn on_teardown(&mut self) {
        self.unload();
    }
}

/// Raw file contents.
#[derive(Debug, Default)]
pub struct FileAsset {
    bytes: Vec<u8>,
}

impl FileAsset {
    /// Returns the loaded file contents.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Asset for FileAsset {
    const CLASS_NAME: &'static str = "File";

    fn load(&mut self, path: &str) -> Result<usize, Box<dyn Error>> {
        self.bytes = std::fs::read(path)?;
        Ok(self.bytes.len())
    }

    fn unload(&mut self) {
        self.bytes = Vec::new();
    }
}
