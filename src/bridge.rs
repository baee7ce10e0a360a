//! Opaque native collaborators of the mobile bridge
//!
//! The kernel and the render surface live behind a native boundary that this
//! crate does not marshal. They are modelled as traits so the service can boot
//! against in-process stand-ins.

use anyhow::Result as AnyResult;
use serde::Serialize;

use crate::error::{MediatorError, Result};

/// Raw status returned by the kernel's init entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KernelStatus(pub i32);

impl KernelStatus {
    pub const READY: KernelStatus = KernelStatus(1);

    pub fn is_ready(&self) -> bool {
        *self == Self::READY
    }
}

pub trait KernelService: Send + Sync {
    fn initialize(&self) -> KernelStatus;
    fn version(&self) -> String;
}

/// Opaque handle to a platform drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle(pub u64);

pub trait RenderSurface: Send + Sync {
    fn start(&self, surface: SurfaceHandle) -> AnyResult<()>;
}

/// In-process kernel that always initializes
pub struct StaticKernel {
    version: String,
}

impl StaticKernel {
    pub const VERSION: &'static str = "1.0.0-ffi.alpha";
}

impl Default for StaticKernel {
    fn default() -> Self {
        Self {
            version: Self::VERSION.to_string(),
        }
    }
}

impl KernelService for StaticKernel {
    fn initialize(&self) -> KernelStatus {
        KernelStatus::READY
    }

    fn version(&self) -> String {
        self.version.clone()
    }
}

/// Surface that only logs; used when nothing is drawn
pub struct HeadlessSurface;

impl RenderSurface for HeadlessSurface {
    fn start(&self, surface: SurfaceHandle) -> AnyResult<()> {
        tracing::debug!(surface = surface.0, "Headless surface started");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BridgeInfo {
    pub status: KernelStatus,
    pub kernel_version: String,
}

pub struct AuraBridge<K, R> {
    kernel: K,
    surface: R,
}

impl<K: KernelService, R: RenderSurface> AuraBridge<K, R> {
    pub fn new(kernel: K, surface: R) -> Self {
        Self { kernel, surface }
    }

    /// Initialize the kernel and report its version
    pub fn boot(&self) -> Result<BridgeInfo> {
        let status = self.kernel.initialize();
        if !status.is_ready() {
            return Err(MediatorError::Bridge(format!(
                "kernel initialization returned status {}",
                status.0
            )));
        }

        let kernel_version = self.kernel.version();
        tracing::info!(version = %kernel_version, "Kernel connection established");

        Ok(BridgeInfo {
            status,
            kernel_version,
        })
    }

    pub fn start_surface(&self, surface: SurfaceHandle) -> Result<()> {
        self.surface.start(surface).map_err(MediatorError::Internal)
    }

    /// Callback from the AI core carrying the current animation intensity
    pub fn on_ai_update(&self, intensity: f32) {
        tracing::debug!(intensity, "AI intensity received");
    }
}
