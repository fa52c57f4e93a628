use daqlink_stream::{StreamValue, ValueStream};

use crate::descr::CallType;
use crate::error::{DispatchError, Result};
use crate::registry::CmdRegistry;

/// Context handed to a handler for one invocation.
///
/// Carries the resolved call direction, the argument/result streams and a
/// reference back to the owning registry, so composite handlers (the JSON
/// bulk dispatcher) can issue nested calls without holding a registry
/// reference of their own.
pub struct CallContext<'a> {
    pub registry: &'a CmdRegistry,
    pub call_type: CallType,
    pub input: &'a mut dyn ValueStream,
    pub output: &'a mut dyn ValueStream,
}

/// A registered command implementation.
pub trait CallHandler: Send + Sync {
    fn call(&self, ctx: CallContext<'_>) -> Result<()>;
}

type GetFn<T> = Box<dyn Fn() -> std::result::Result<T, String> + Send + Sync>;
type SetFn<T> = Box<dyn Fn(T) -> std::result::Result<(), String> + Send + Sync>;

/// A get/set capability over one typed access point.
///
/// Either closure may be absent; a request for the missing direction
/// resolves to `GetNotSupported`/`SetNotSupported`. When both are present,
/// a successful set echoes the freshly read-back value on the output
/// stream (read-after-write feedback).
pub struct Setting<T: StreamValue> {
    get: Option<GetFn<T>>,
    set: Option<SetFn<T>>,
}

impl<T: StreamValue> Setting<T> {
    /// A gettable-only access point.
    pub fn read_only(get: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            get: Some(Box::new(move || Ok(get()))),
            set: None,
        }
    }

    /// A settable-only access point.
    pub fn write_only(set: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            get: None,
            set: Some(Box::new(move |value| {
                set(value);
                Ok(())
            })),
        }
    }

    /// A gettable and settable access point.
    pub fn read_write(
        get: impl Fn() -> T + Send + Sync + 'static,
        set: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Some(Box::new(move || Ok(get()))),
            set: Some(Box::new(move |value| {
                set(value);
                Ok(())
            })),
        }
    }

    /// A fallible access point; closure errors propagate as the wire
    /// reason string.
    pub fn try_read_write(
        get: impl Fn() -> std::result::Result<T, String> + Send + Sync + 'static,
        set: impl Fn(T) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Some(Box::new(get)),
            set: Some(Box::new(set)),
        }
    }
}

impl<T: StreamValue> CallHandler for Setting<T> {
    fn call(&self, ctx: CallContext<'_>) -> Result<()> {
        match ctx.call_type {
            CallType::Set => {
                let Some(set) = &self.set else {
                    return Err(DispatchError::SetNotSupported);
                };
                let value = T::read_from(ctx.input)?;
                set(value).map_err(DispatchError::Handler)?;
                if let Some(get) = &self.get {
                    let current = get().map_err(DispatchError::Handler)?;
                    current.write_to(ctx.output)?;
                }
                Ok(())
            }
            CallType::Get => {
                let Some(get) = &self.get else {
                    return Err(DispatchError::GetNotSupported);
                };
                let value = get().map_err(DispatchError::Handler)?;
                value.write_to(ctx.output)?;
                Ok(())
            }
        }
    }
}
