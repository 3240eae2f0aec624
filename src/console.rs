use crate::hal::{console_flush, console_putchar};
use core::fmt::{self, Write};
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

struct Stdout;

impl Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut i = 0;
        for b in s.bytes() {
            console_putchar(b as usize);
            i += 1;
            if i >= 4 {
                console_flush();
                i = 0;
            }
        }
        if i != 0 {
            console_flush();
        }
        Ok(())
    }
}

/// 串行化控制台输出，避免中断上下文的日志与任务日志交错
static STDOUT: Mutex<Stdout> = Mutex::new(Stdout);

pub fn print(args: fmt::Arguments) {
    let _ = STDOUT.lock().write_fmt(args);
}

#[macro_export]
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!($fmt $(, $($arg)+)?))
    }
}

#[macro_export]
macro_rules! println {
    ($fmt: literal) => {
        $crate::console::print(format_args!(concat!($fmt, "\n")))
    };
    ($fmt: literal, $($arg: tt)*) => {
        $crate::console::print(format_args!(concat!($fmt, "\n"), $($arg)*))
    };
}

/// 安装内核日志器
///
/// ## Behavior
/// - 日志级别由编译期环境变量 `LOG` 决定，缺省关闭
/// - 重复调用时保留第一次安装的日志器，只更新级别
pub fn init() {
    static LOGGER: Logger = Logger;
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(match option_env!("LOG") {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Off,
    });
}

struct Logger;
impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!(
            "\x1b[{}m[{:>5}] {}\x1b[0m",
            level_to_color_code(record.level()),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

fn level_to_color_code(level: Level) -> u8 {
    match level {
        Level::Error => 31, // Red
        Level::Warn => 93,  // BrightYellow
        Level::Info => 34,  // Blue
        Level::Debug => 32, // Green
        Level::Trace => 90, // BrightBlack
    }
}
