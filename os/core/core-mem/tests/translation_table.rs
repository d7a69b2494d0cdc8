use core_addresses::{PhysicalAddress, TranslateError, VirtualAddress};
use core_mem::translation_table::{TABLE_SIZE, TableAllocator, TableError, TablePool};
use core_mem::{Allocator, TranslationTableAllocator};
use std::collections::HashSet;
use std::ptr::NonNull;
use std::sync::Barrier;
use std::thread;

const PHYS_BASE: u64 = 0x2_0000_0000;

#[test]
fn frees_make_the_lowest_table_available_again() {
    let pool = Box::new(TablePool::<4>::new());
    let tables = TableAllocator::new(&pool).unwrap();

    let t0 = tables.alloc_table().unwrap();
    let t1 = tables.alloc_table().unwrap();
    assert_eq!((t0.index(), t1.index()), (0, 1));
    assert_eq!(t0.virt(), pool.base());

    tables.free_table(t0).unwrap();
    assert_eq!(tables.alloc_table().unwrap().index(), 0);
    assert_eq!(tables.tables_in_use(), 2);
    assert_eq!(tables.capacity(), 4);
}

#[test]
fn pool_is_exhausted_after_capacity_allocations() {
    let pool = Box::new(TablePool::<4>::new());
    let tables = TableAllocator::new(&pool).unwrap();

    let held: Vec<_> = (0..4).map(|_| tables.alloc_table().unwrap()).collect();
    assert_eq!(tables.alloc_table(), Err(TableError::OutOfTables(4)));
    assert!(tables.alloc(TABLE_SIZE).is_none());

    for t in held {
        tables.free_table(t).unwrap();
    }
    assert_eq!(tables.tables_in_use(), 0);
}

#[test]
fn translation_is_an_offset_within_the_pool() {
    let pool = Box::new(TablePool::<4>::new());
    let tables = TableAllocator::with_phys_base(&pool, PhysicalAddress::new(PHYS_BASE)).unwrap();
    let base = pool.base();

    for off in [0, 8, 0xFFF, 0x1000, 0x2345, 4 * TABLE_SIZE as u64 - 1] {
        let va = base + off;
        let pa = tables.phys_addr(va).unwrap();
        assert_eq!(pa, PhysicalAddress::new(PHYS_BASE + off));
        assert_eq!(tables.virt_addr(pa).unwrap(), va);
    }

    let past = base + 4 * TABLE_SIZE as u64;
    assert_eq!(tables.phys_addr(past), Err(TranslateError::VirtualOutOfRange(past)));
    let below = PhysicalAddress::new(PHYS_BASE - 1);
    assert_eq!(tables.virt_addr(below), Err(TranslateError::PhysicalOutOfRange(below)));
}

#[test]
fn a_pool_has_a_single_allocator() {
    static POOL: TablePool<4> = TablePool::new();

    let first = TableAllocator::new(&POOL).unwrap();
    assert_eq!(
        TableAllocator::new(&POOL).err(),
        Some(TableError::PoolClaimed(POOL.base()))
    );
    assert_eq!(
        TableAllocator::with_phys_base(&POOL, PhysicalAddress::new(PHYS_BASE)).err(),
        Some(TableError::PoolClaimed(POOL.base()))
    );

    // dropping the allocator does not hand the pool to a new one
    let table = first.alloc_table().unwrap();
    assert_eq!(table.index(), 0);
    drop(first);
    assert!(TableAllocator::new(&POOL).is_err());
}

#[test]
fn racing_constructors_claim_the_pool_once() {
    const THREADS: usize = 6;
    let pool = Box::new(TablePool::<2>::new());
    let barrier = Barrier::new(THREADS);

    let claimed = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    TableAllocator::new(&pool).is_ok()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count()
    });
    assert_eq!(claimed, 1);
}

#[test]
fn tables_are_not_zeroed_between_owners() {
    let pool = Box::new(TablePool::<2>::new());
    let tables = TableAllocator::new(&pool).unwrap();

    let t = tables.alloc_table().unwrap();
    let index = t.index();
    // SAFETY: the handle grants exclusive access to TABLE_SIZE bytes.
    unsafe { t.as_mut_ptr().as_ptr().add(17).write(0xAB) };
    tables.free_table(t).unwrap();

    let again = tables.alloc_table().unwrap();
    assert_eq!(again.index(), index);
    // SAFETY: as above.
    assert_eq!(unsafe { again.as_mut_ptr().as_ptr().add(17).read() }, 0xAB);
}

#[test]
fn invalid_frees_leave_the_tracker_untouched() {
    let pool = Box::new(TablePool::<2>::new());
    let tables = TableAllocator::new(&pool).unwrap();
    let t = tables.alloc_table().unwrap();

    let mut outside = [0_u8; 8];
    tables.free(NonNull::from(&mut outside).cast(), TABLE_SIZE);
    // SAFETY: still inside the same table.
    let inside = unsafe { t.as_mut_ptr().add(1) };
    tables.free(inside, TABLE_SIZE);
    assert_eq!(tables.tables_in_use(), 1);

    tables.free(t.as_mut_ptr(), TABLE_SIZE);
    assert_eq!(tables.tables_in_use(), 0);
    assert_eq!(
        tables.free_addr(pool.base()),
        Err(TableError::NotAllocated(0))
    );
}

#[test]
fn concurrent_allocations_are_distinct() {
    const THREADS: usize = 8;
    let pool = Box::new(TablePool::<THREADS>::new());
    let tables = TableAllocator::new(&pool).unwrap();
    let barrier = Barrier::new(THREADS);

    let indices: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    tables.alloc_table().unwrap().index()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<_> = indices.iter().copied().collect();
    assert_eq!(unique.len(), THREADS);
    assert_eq!(tables.tables_in_use(), THREADS);
    assert_eq!(tables.alloc_table(), Err(TableError::OutOfTables(THREADS)));
}

fn build_root(alloc: &dyn TranslationTableAllocator) -> (VirtualAddress, PhysicalAddress) {
    let ptr = alloc.alloc(TABLE_SIZE).unwrap();
    let virt = VirtualAddress::from_nonnull(ptr);
    let phys = alloc.phys_addr(virt).unwrap();
    (virt, phys)
}

#[test]
fn usable_through_the_generic_interface() {
    let pool = Box::new(TablePool::<2>::new());
    let tables = TableAllocator::with_phys_base(&pool, PhysicalAddress::new(PHYS_BASE)).unwrap();

    let (virt, phys) = build_root(&tables);
    assert_eq!(phys, PhysicalAddress::new(PHYS_BASE));
    assert_eq!(tables.virt_addr(phys).unwrap(), virt);

    let dynamic: &dyn Allocator = &tables;
    assert_eq!(dynamic.consumed(), 0);
    assert_eq!(dynamic.overhead(TABLE_SIZE), 0);
    assert!(!dynamic.need_size_for_free());
    assert!(dynamic.alloc(TABLE_SIZE + 1).is_none());
}
