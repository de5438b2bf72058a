//! # Voxel Storage
//!
//! This module contains the in-memory voxel model: the block value type, the
//! block container every chunk is built on, and the hierarchy that maps world
//! positions onto chunks.
//!
//! ## Architecture
//!
//! * **Block**: The exhaustive `Air | Solid | Sprite` cell value and the six block sides
//! * **BlockContainer**: A lazily allocated, individually locked 3D array of blocks
//! * **Chunk**: A 32³ container with a world origin and a dirty flag
//! * **ChunkManager**: The fixed chunk grid and the authoritative world-block API
//! * **WorldContext**: A transient per-chunk buffer filled while a world is loaded
//!
//! ## Data Flow
//!
//! 1. A loader fills a `WorldContext`
//! 2. `ChunkManager::install_world` copies it into the chunks and marks them dirty
//! 3. Writes through the manager keep marking chunks dirty
//! 4. `ChunkManager::update` schedules one re-mesh per dirty chunk per tick
//!
//! ## Thread Safety
//!
//! Every container guards its cells with its own lock, held for one read or write
//! at a time. The chunk array never changes after construction, and dirty flags
//! are atomics, so the manager itself needs no lock.

pub mod block;
pub mod block_container;
pub mod chunk;
pub mod chunk_manager;
pub mod world_context;
