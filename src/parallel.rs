//! Data-parallel execution strategies for CPU-bound loops.
//!
//! Every entry point hands each worker a disjoint sub-slice of the output,
//! so results are bit-for-bit independent of scheduling and thread count.
//! Three partitioning strategies cover the stages of the commitment
//! pipeline: static contiguous ranges for uniform per-item cost (row
//! encoding, tree levels), dynamically pulled fixed-size blocks for uneven
//! cost (transversal hashing over mixed constant/regular rows), and
//! per-worker scratch reuse for stateful inner loops (leaf hashing).
//!
//! With the `parallel` feature disabled all strategies degrade to the
//! single-threaded loop, which doubles as the reference behaviour.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Statically partitions `out` into one contiguous range per worker and runs
/// `f(offset, chunk)` on each range.
pub fn execute<T, F>(out: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if out.is_empty() {
        return;
    }
    #[cfg(feature = "parallel")]
    {
        let chunk_size = out.len().div_ceil(rayon::current_num_threads()).max(1);
        out.par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(|(i, chunk)| f(i * chunk_size, chunk));
    }
    #[cfg(not(feature = "parallel"))]
    f(0, out);
}

/// Splits `out` into blocks of `block` items that idle workers pull until
/// the work runs out.
///
/// `block` trades scheduling overhead against load balance; use this when
/// per-item cost varies too much for a static split.
pub fn execute_chunky<T, F>(out: &mut [T], block: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    assert!(block > 0, "block size must be nonzero");
    #[cfg(feature = "parallel")]
    out.par_chunks_mut(block)
        .enumerate()
        .for_each(|(i, chunk)| f(i * block, chunk));
    #[cfg(not(feature = "parallel"))]
    for (i, chunk) in out.chunks_mut(block).enumerate() {
        f(i * block, chunk);
    }
}

/// Like [`execute_chunky`], but each worker first builds private scratch via
/// `init` and reuses it across every block it processes.
///
/// Keeps hasher states and limb buffers out of the per-item path without
/// sharing mutable state across threads.
pub fn execute_with_scratch<T, S, I, F>(out: &mut [T], block: usize, init: I, f: F)
where
    T: Send,
    I: Fn() -> S + Sync + Send,
    F: Fn(&mut S, usize, &mut [T]) + Sync + Send,
{
    assert!(block > 0, "block size must be nonzero");
    #[cfg(feature = "parallel")]
    out.par_chunks_mut(block)
        .enumerate()
        .for_each_init(&init, |scratch, (i, chunk)| f(scratch, i * block, chunk));
    #[cfg(not(feature = "parallel"))]
    {
        let mut scratch = init();
        for (i, chunk) in out.chunks_mut(block).enumerate() {
            f(&mut scratch, i * block, chunk);
        }
    }
}
