#[cfg(all(feature = "riscv", target_arch = "riscv64", target_os = "none"))]
pub mod riscv;

#[cfg(all(feature = "riscv", target_arch = "riscv64", target_os = "none"))]
pub use riscv::{
    console_flush, console_putchar, intr_get, intr_off, intr_on, with_intr_masking_info,
};

#[cfg(all(
    target_os = "none",
    not(all(feature = "riscv", target_arch = "riscv64"))
))]
compile_error!("unsupported bare-metal target: enable a board feature matching the target arch");

#[cfg(not(target_os = "none"))]
pub mod hosted;

#[cfg(not(target_os = "none"))]
pub use hosted::{
    console_flush, console_putchar, intr_get, intr_off, intr_on, with_intr_masking_info,
};
