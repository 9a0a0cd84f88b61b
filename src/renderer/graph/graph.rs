//! Frame Graph
//!
//! `FrameGraph` is rebuilt every frame. Nodes declare passes, the textures each
//! pass reads and writes, and a render function that records commands.
//! [`FrameGraph::execute`] then:
//!
//! 1. culls passes whose writes are never consumed,
//! 2. allocates transient textures for the surviving passes from the
//!    [`TransientTexturePool`],
//! 3. runs render functions in declaration order, one [`CommandBuffer`] each.
//!
//! A write is *consumed* when a later live pass reads it, when the texture is
//! imported (owned by the host), or when the pass publishes it as a global
//! texture. Passes with `allow_pass_culling(false)` always run.
//!
//! Global keywords, vectors and textures recorded by a render function are
//! kept only for passes that called `allow_global_state_modification(true)`.
//! Otherwise they are stripped, logged and listed in
//! [`ExecutedGraph::rejected_global_state`]. Textures bound through
//! `set_global_texture_after_pass` are declared on the graph and need no
//! opt-in.

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::command::CommandBuffer;
use super::transient_pool::{TransientTextureDesc, TransientTextureId, TransientTexturePool};
use crate::errors::{AomError, Result};

/// Graph-local texture handle. Valid for the frame that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureHandle(u32);

bitflags! {
    /// How a pass touches a texture.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Access: u8 {
        const READ       = 1 << 0;
        const WRITE      = 1 << 1;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureOrigin {
    Imported,
    Transient,
}

#[derive(Debug)]
struct GraphTexture {
    desc: TransientTextureDesc,
    origin: TextureOrigin,
}

/// Command-recording callback of a pass.
pub type RenderFunc = Box<dyn FnOnce(&mut RasterContext<'_>)>;

struct PassRecord {
    name: &'static str,
    accesses: SmallVec<[(TextureHandle, Access); 8]>,
    allow_culling: bool,
    allow_global_state: bool,
    global_textures: SmallVec<[(&'static str, TextureHandle); 2]>,
    render_func: Option<RenderFunc>,
}

impl PassRecord {
    fn writes(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.accesses
            .iter()
            .filter(|(_, a)| a.contains(Access::WRITE))
            .map(|(h, _)| *h)
    }

    fn reads(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.accesses
            .iter()
            .filter(|(_, a)| a.contains(Access::READ))
            .map(|(h, _)| *h)
    }
}

// ─── Graph ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FrameGraph {
    textures: Vec<GraphTexture>,
    passes: Vec<PassRecord>,
}

impl FrameGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a host-owned texture.
    pub fn import_texture(&mut self, desc: TransientTextureDesc) -> TextureHandle {
        self.push_texture(desc, TextureOrigin::Imported)
    }

    /// Declares a transient texture, allocated only if a live pass uses it.
    pub fn create_texture(&mut self, desc: TransientTextureDesc) -> TextureHandle {
        self.push_texture(desc, TextureOrigin::Transient)
    }

    fn push_texture(&mut self, desc: TransientTextureDesc, origin: TextureOrigin) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(GraphTexture { desc, origin });
        handle
    }

    #[must_use]
    pub fn texture_desc(&self, handle: TextureHandle) -> Option<&TransientTextureDesc> {
        self.textures.get(handle.0 as usize).map(|t| &t.desc)
    }

    #[must_use]
    pub fn is_imported(&self, handle: TextureHandle) -> bool {
        self.textures
            .get(handle.0 as usize)
            .is_some_and(|t| t.origin == TextureOrigin::Imported)
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Starts declaring a pass. Passes are cullable by default.
    pub fn add_pass(&mut self, name: &'static str) -> PassBuilder<'_> {
        self.passes.push(PassRecord {
            name,
            accesses: SmallVec::new(),
            allow_culling: true,
            allow_global_state: false,
            global_textures: SmallVec::new(),
            render_func: None,
        });
        let index = self.passes.len() - 1;
        PassBuilder { graph: self, index }
    }

    // ─── Execution ────────────────────────────────────────────────────────

    fn validate(&self) -> Result<()> {
        let count = self.textures.len();
        for pass in &self.passes {
            let handles = pass
                .accesses
                .iter()
                .map(|(h, _)| *h)
                .chain(pass.global_textures.iter().map(|(_, h)| *h));
            for handle in handles {
                if handle.0 as usize >= count {
                    return Err(AomError::InvalidTexture(format!(
                        "{handle:?} used by pass '{}'",
                        pass.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Reverse walk: a pass lives if it cannot be culled or if one of its
    /// writes is consumed.
    fn live_passes(&self) -> Vec<bool> {
        let mut live = vec![false; self.passes.len()];
        let mut consumed: FxHashSet<TextureHandle> = FxHashSet::default();

        for (index, pass) in self.passes.iter().enumerate().rev() {
            let has_side_effects = !pass.allow_culling
                || !pass.global_textures.is_empty()
                || pass.writes().any(|h| self.is_imported(h) || consumed.contains(&h));

            if has_side_effects {
                live[index] = true;
                consumed.extend(pass.reads());
            }
        }
        live
    }

    /// Culls, allocates and records the frame.
    pub fn execute(self, pool: &mut TransientTexturePool) -> Result<ExecutedGraph> {
        self.validate()?;
        let live = self.live_passes();

        let mut allocations: FxHashMap<TextureHandle, TransientTextureId> = FxHashMap::default();
        for (pass, _) in self.passes.iter().zip(&live).filter(|(_, l)| **l) {
            for (handle, _) in &pass.accesses {
                let texture = &self.textures[handle.0 as usize];
                if texture.origin == TextureOrigin::Transient && !allocations.contains_key(handle)
                {
                    allocations.insert(*handle, pool.allocate(&texture.desc));
                }
            }
        }

        let FrameGraph { textures, passes } = self;
        let mut executed = ExecutedGraph {
            passes: Vec::with_capacity(passes.len()),
            culled: Vec::new(),
            allocated_textures: allocations.len(),
            rejected_global_state: Vec::new(),
        };

        for (pass, is_live) in passes.into_iter().zip(live) {
            if !is_live {
                log::debug!("Frame graph: culled pass '{}'", pass.name);
                executed.culled.push(pass.name);
                continue;
            }

            let mut cmd = CommandBuffer::new();
            if let Some(render_func) = pass.render_func {
                let mut ctx = RasterContext {
                    cmd: &mut cmd,
                    textures: &textures,
                };
                render_func(&mut ctx);
            }
            if !pass.allow_global_state {
                let stripped = cmd.strip_global_state();
                if stripped > 0 {
                    log::warn!(
                        "Frame graph: pass '{}' set {stripped} global state value(s) without opting in, ignored",
                        pass.name
                    );
                    executed.rejected_global_state.push(pass.name);
                }
            }
            for (name, texture) in pass.global_textures {
                cmd.set_global_texture(name, texture);
            }

            executed.passes.push(ExecutedPass {
                name: pass.name,
                commands: cmd,
            });
        }

        Ok(executed)
    }
}

// ─── Pass Builder ─────────────────────────────────────────────────────────────

/// Declares the resources and callback of one pass.
pub struct PassBuilder<'g> {
    graph: &'g mut FrameGraph,
    index: usize,
}

impl PassBuilder<'_> {
    fn record(&mut self) -> &mut PassRecord {
        &mut self.graph.passes[self.index]
    }

    /// Declares an access. Repeated declarations merge their flags.
    pub fn use_texture(&mut self, handle: TextureHandle, access: Access) -> &mut Self {
        let record = self.record();
        if let Some((_, existing)) = record.accesses.iter_mut().find(|(h, _)| *h == handle) {
            *existing |= access;
        } else {
            record.accesses.push((handle, access));
        }
        self
    }

    pub fn allow_pass_culling(&mut self, allow: bool) -> &mut Self {
        self.record().allow_culling = allow;
        self
    }

    pub fn allow_global_state_modification(&mut self, allow: bool) -> &mut Self {
        self.record().allow_global_state = allow;
        self
    }

    /// Binds `handle` as a global texture once the pass has executed.
    pub fn set_global_texture_after_pass(
        &mut self,
        handle: TextureHandle,
        name: &'static str,
    ) -> &mut Self {
        self.record().global_textures.push((name, handle));
        self
    }

    pub fn set_render_func<F>(&mut self, func: F) -> &mut Self
    where
        F: FnOnce(&mut RasterContext<'_>) + 'static,
    {
        self.record().render_func = Some(Box::new(func));
        self
    }
}

// ─── Execution Context ────────────────────────────────────────────────────────

/// What a render function sees while recording.
pub struct RasterContext<'a> {
    pub cmd: &'a mut CommandBuffer,
    textures: &'a [GraphTexture],
}

impl RasterContext<'_> {
    #[must_use]
    pub fn texture_desc(&self, handle: TextureHandle) -> Option<&TransientTextureDesc> {
        self.textures.get(handle.0 as usize).map(|t| &t.desc)
    }
}

// ─── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedPass {
    pub name: &'static str,
    pub commands: CommandBuffer,
}

/// Outcome of one [`FrameGraph::execute`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutedGraph {
    pub passes: Vec<ExecutedPass>,
    pub culled: Vec<&'static str>,
    pub allocated_textures: usize,
    /// Passes whose global state commands were stripped.
    pub rejected_global_state: Vec<&'static str>,
}

impl ExecutedGraph {
    #[must_use]
    pub fn pass(&self, name: &str) -> Option<&ExecutedPass> {
        self.passes.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt(label: &'static str) -> TransientTextureDesc {
        TransientTextureDesc::render_target(label, 8, 8, wgpu::TextureFormat::Rgba8Unorm)
    }

    #[test]
    fn unconsumed_transient_write_is_culled() {
        let mut graph = FrameGraph::new();
        let scratch = graph.create_texture(rt("scratch"));
        graph
            .add_pass("Orphan")
            .use_texture(scratch, Access::WRITE);

        let mut pool = TransientTexturePool::new();
        let executed = graph.execute(&mut pool).unwrap();
        assert_eq!(executed.culled, vec!["Orphan"]);
        assert_eq!(executed.allocated_textures, 0);
    }

    #[test]
    fn chain_into_imported_target_survives() {
        let mut graph = FrameGraph::new();
        let color = graph.import_texture(rt("color"));
        let scratch = graph.create_texture(rt("scratch"));
        graph.add_pass("Produce").use_texture(scratch, Access::WRITE);
        graph
            .add_pass("Resolve")
            .use_texture(scratch, Access::READ)
            .use_texture(color, Access::WRITE);

        let mut pool = TransientTexturePool::new();
        let executed = graph.execute(&mut pool).unwrap();
        assert_eq!(executed.pass_names(), vec!["Produce", "Resolve"]);
        assert_eq!(executed.allocated_textures, 1);
    }

    #[test]
    fn global_state_needs_opt_in() {
        let mut graph = FrameGraph::new();
        let color = graph.import_texture(rt("color"));
        graph
            .add_pass("Sneaky")
            .use_texture(color, Access::WRITE)
            .set_render_func(|ctx| {
                ctx.cmd.set_global_keyword("_A", true);
                ctx.cmd.set_global_vector("_B", glam::Vec4::ONE);
            });
        graph
            .add_pass("Publisher")
            .use_texture(color, Access::WRITE)
            .allow_global_state_modification(true)
            .set_render_func(|ctx| ctx.cmd.set_global_keyword("_A", true));

        let mut pool = TransientTexturePool::new();
        let executed = graph.execute(&mut pool).unwrap();
        assert_eq!(executed.rejected_global_state, vec!["Sneaky"]);
        assert!(executed.pass("Sneaky").unwrap().commands.is_empty());
        assert_eq!(executed.pass("Publisher").unwrap().commands.len(), 1);
    }

    #[test]
    fn declared_global_texture_needs_no_opt_in() {
        let mut graph = FrameGraph::new();
        let scratch = graph.create_texture(rt("scratch"));
        graph
            .add_pass("Publish")
            .use_texture(scratch, Access::WRITE)
            .set_global_texture_after_pass(scratch, "_Published");

        let mut pool = TransientTexturePool::new();
        let executed = graph.execute(&mut pool).unwrap();
        assert!(executed.rejected_global_state.is_empty());
        assert_eq!(executed.pass("Publish").unwrap().commands.len(), 1);
    }

    #[test]
    fn access_flags_merge() {
        let mut graph = FrameGraph::new();
        let tex = graph.create_texture(rt("t"));
        graph
            .add_pass("P")
            .use_texture(tex, Access::READ)
            .use_texture(tex, Access::WRITE);
        assert_eq!(graph.passes[0].accesses.as_slice(), &[(tex, Access::READ_WRITE)]);
    }
}
