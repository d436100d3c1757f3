//! Attach to the test binary itself and drive it through the public API.

#![cfg(any(target_os = "windows", target_os = "linux"))]

use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use catalyst::{
    Error, MemoryReader, ModuleLookup, PointerChain, ProcessHandle, ReadMemory, RemoteValue,
    ValueSnapshot, WriteMemory, read_at_chain, write_at_chain,
};

static STATIC_VALUE: AtomicI32 = AtomicI32::new(42);
static WRITE_TARGET: AtomicI32 = AtomicI32::new(42);
static HOLDER: AtomicU64 = AtomicU64::new(0);

/// Held while a second copy of this binary may be running
static CHILD_LOCK: Mutex<()> = Mutex::new(());

fn module_name() -> String {
    let exe = std::env::current_exe().unwrap();
    exe.file_name().unwrap().to_string_lossy().into_owned()
}

fn open_self() -> ProcessHandle {
    ProcessHandle::open(std::process::id()).unwrap()
}

/// Chain `module:<offset of value>` for a static in this binary
fn static_chain<T>(memory: &MemoryReader, value: &T) -> PointerChain {
    let module = module_name();
    let base = memory.module_base(&module).unwrap();
    let offset = value as *const T as u64 - base;
    PointerChain::module(module, [offset as i64])
}

/// Same chain, usable against any running copy of this binary
fn own_static_chain<T>(value: &T) -> PointerChain {
    let process = open_self();
    static_chain(&MemoryReader::new(&process), value)
}

/// A copy of this binary parked in `idle_child`, killed on drop
struct IdleChild(Child);

impl IdleChild {
    fn spawn() -> Self {
        let child = Command::new(std::env::current_exe().unwrap())
            .args(["idle_child", "--exact", "--ignored", "--test-threads=1"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        Self(child)
    }

    fn pid(&self) -> u32 {
        self.0.id()
    }

    fn kill(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

impl Drop for IdleChild {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Read `chain` until it yields `expected`; the child's loader may still be running
fn wait_for_value(memory: &MemoryReader, chain: &PointerChain, expected: i32) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match read_at_chain::<i32, _>(memory, chain) {
            Ok(value) if value == expected => return,
            other if Instant::now() >= deadline => {
                panic!("child never became readable: {:?}", other)
            }
            _ => thread::sleep(Duration::from_millis(50)),
        }
    }
}

#[test]
#[ignore = "runs as the child process of the attach tests"]
fn idle_child() {
    thread::sleep(Duration::from_secs(30));
}

#[test]
fn test_reads_static_through_module_chain() {
    let process = open_self();
    let memory = MemoryReader::new(&process);
    let chain = static_chain(&memory, &STATIC_VALUE);

    assert_eq!(chain.depth(), 0);
    assert_eq!(read_at_chain::<i32, _>(&memory, &chain).unwrap(), 42);
}

#[test]
fn test_write_then_read() {
    let process = open_self();
    let memory = MemoryReader::new(&process);
    let chain = static_chain(&memory, &WRITE_TARGET);

    write_at_chain(&memory, &chain, 7i32).unwrap();

    assert_eq!(read_at_chain::<i32, _>(&memory, &chain).unwrap(), 7);
    assert_eq!(WRITE_TARGET.load(Ordering::SeqCst), 7);
}

#[test]
fn test_follows_heap_pointer() {
    let values: Box<[AtomicI32; 4]> = Box::new([
        AtomicI32::new(10),
        AtomicI32::new(20),
        AtomicI32::new(30),
        AtomicI32::new(40),
    ]);
    HOLDER.store(values.as_ptr() as u64, Ordering::SeqCst);

    let process = open_self();
    let memory = MemoryReader::new(&process);
    let field = RemoteValue::<i32>::new(static_chain(&memory, &HOLDER).then(8));

    assert_eq!(field.chain().depth(), 1);
    assert_eq!(field.address(&memory).unwrap(), &values[2] as *const _ as u64);
    assert_eq!(field.read(&memory).unwrap(), 30);

    let mut snapshot = ValueSnapshot::new();
    snapshot.update(field.read(&memory).unwrap());
    values[2].store(31, Ordering::SeqCst);
    snapshot.update(field.read(&memory).unwrap());
    assert_eq!((snapshot.previous(), snapshot.current()), (30, 31));
}

#[test]
fn test_unmapped_address_faults() {
    let process = open_self();
    let memory = MemoryReader::new(&process);
    let chain = PointerChain::absolute(0, [0x10]);

    assert_eq!(chain.resolve(&memory).unwrap(), 0x10);
    match read_at_chain::<u64, _>(&memory, &chain) {
        Err(Error::MemoryReadFault { address: 0x10, .. }) | Err(Error::AccessDenied(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_unknown_module() {
    let process = open_self();
    let memory = MemoryReader::new(&process);

    assert!(matches!(
        memory.module_base("no-such-module.dll"),
        Err(Error::ModuleNotFound(_))
    ));
}

#[test]
fn test_attach_unknown_name() {
    assert!(matches!(
        ProcessHandle::attach("no-such-process-7f3a.exe"),
        Err(Error::ProcessNotFound(_))
    ));
}

#[test]
fn test_released_handle_refuses_io() {
    let mut process = open_self();
    assert!(process.is_alive());

    process.release();
    process.release();

    assert!(!process.is_open());
    let memory = MemoryReader::new(&process);
    assert!(memory.read_u32(0x1000).is_err());
}

#[test]
fn test_attach_by_name_reads_module_chain() {
    let _guard = CHILD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let chain = own_static_chain(&STATIC_VALUE);

    let process = ProcessHandle::attach(&module_name()).unwrap();
    assert!(process.is_alive());

    let memory = MemoryReader::new(&process);
    let address = chain.resolve(&memory).unwrap();
    assert_eq!(address, process.base_address + chain.offsets()[0] as u64);
    assert_eq!(read_at_chain::<i32, _>(&memory, &chain).unwrap(), 42);
}

#[test]
fn test_exited_process_reports_terminated() {
    let _guard = CHILD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let chain = own_static_chain(&STATIC_VALUE);

    let mut child = IdleChild::spawn();
    let pid = child.pid();
    let process = ProcessHandle::open(pid).unwrap();
    let memory = MemoryReader::new(&process);
    wait_for_value(&memory, &chain, 42);

    child.kill();
    assert!(!process.is_alive());

    assert!(matches!(
        read_at_chain::<i32, _>(&memory, &chain),
        Err(Error::ProcessTerminated { pid: p }) if p == pid
    ));
    assert!(matches!(
        memory.read_u32(process.base_address),
        Err(Error::ProcessTerminated { pid: p }) if p == pid
    ));
    assert!(matches!(
        memory.write_value(process.base_address, 7u32),
        Err(Error::ProcessTerminated { pid: p }) if p == pid
    ));
    assert!(matches!(
        memory.module_base(&module_name()),
        Err(Error::ProcessTerminated { pid: p }) if p == pid
    ));
}
