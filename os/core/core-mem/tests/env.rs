mod common;

use common::{FakeMapper, FakeUntyped};
use core_mem::context_area::ContextArea;
use core_mem::env::{CoreEnv, EnvError};
use core_mem::translation_table::{TableAllocator, TablePool};

static POOL: TablePool<4> = TablePool::new();
static SPARE: TablePool<4> = TablePool::new();

#[test]
fn parts_are_installed_exactly_once() {
    let env: CoreEnv<FakeUntyped, FakeMapper, 4, 8> = CoreEnv::new();

    assert_eq!(env.tables().err(), Some(EnvError::NotInitialized("translation table allocator")));
    assert_eq!(env.context_area_rm().err(), Some(EnvError::NotInitialized("context area")));
    assert_eq!(env.context_area_ram().err(), Some(EnvError::NotInitialized("context area")));

    let tables = env.install_tables(TableAllocator::new(&POOL).unwrap()).unwrap();
    assert_eq!(tables.window().virt_base(), POOL.base());
    assert_eq!(
        env.install_tables(TableAllocator::new(&SPARE).unwrap()).err(),
        Some(EnvError::AlreadyInitialized("translation table allocator"))
    );

    env.install(ContextArea::new(FakeUntyped::new(0x8000_0000, 0x1_0000), FakeMapper::default()))
        .unwrap();
    assert_eq!(
        env.install(ContextArea::new(FakeUntyped::new(0, 0), FakeMapper::default()))
            .err()
            .map(|e| e.to_string()),
        Some("context area is already installed".to_owned())
    );

    let rm = env.context_area_rm().unwrap();
    assert_eq!(rm.attach(0x1000, 0), Ok(0));
    // the first context area stays in place
    assert_eq!(rm.untyped().requests(), vec![0x1000]);
    assert_eq!(env.context_area_ram().unwrap().quota(), 0);
    assert_eq!(env.tables().unwrap().alloc_table().unwrap().index(), 0);
}
