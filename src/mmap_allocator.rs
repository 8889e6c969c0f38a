use allocator_api2::alloc::{AllocError, Allocator, Layout};
use std::ptr::NonNull;
use std::sync::OnceLock;

/// Backs station tables with anonymous mappings so large per-chunk tables
/// come straight from the kernel and can optionally sit on huge pages.
///
/// Every allocation is its own mapping; the allocator holds no state besides
/// its options, so it is freely `Send` across worker threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct MmapAllocator {
    request_hugepage: bool,
}

pub struct AllocatorOptions {
    pub request_hugepage: bool,
}

fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(|| {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 { size as usize } else { 4096 }
    })
}

/// Length of the mapping that backs `layout`, rounded up to whole pages.
fn mapping_len(layout: &Layout) -> Option<usize> {
    let page = page_size();
    layout
        .size()
        .max(1)
        .checked_add(page - 1)
        .map(|len| len & !(page - 1))
}

/// Advisory only; a refusal leaves the mapping on normal pages.
#[cfg(target_os = "linux")]
fn advise_hugepage(ptr: *mut libc::c_void, len: usize) {
    let rc = unsafe { libc::madvise(ptr, len, libc::MADV_HUGEPAGE) };
    if rc != 0 {
        tracing::debug!(len, "madvise(MADV_HUGEPAGE) refused");
    }
}

#[cfg(not(target_os = "linux"))]
fn advise_hugepage(_ptr: *mut libc::c_void, _len: usize) {}

impl MmapAllocator {
    pub fn new(opts: &AllocatorOptions) -> Self {
        Self {
            request_hugepage: opts.request_hugepage,
        }
    }
}

unsafe impl Allocator for MmapAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        // Mappings are only page aligned.
        if layout.align() > page_size() {
            return Err(AllocError);
        }
        let len = mapping_len(&layout).ok_or(AllocError)?;

        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(AllocError);
        }

        if self.request_hugepage {
            advise_hugepage(ptr, len);
        }

        let nn = NonNull::new(ptr as *mut u8).ok_or(AllocError)?;
        Ok(NonNull::slice_from_raw_parts(nn, len))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Some(len) = mapping_len(&layout) {
            unsafe { libc::munmap(ptr.as_ptr() as *mut libc::c_void, len) };
        }
    }
}
