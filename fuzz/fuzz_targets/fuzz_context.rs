#![no_main]

//! Fuzz target for context registration, refresh and lookup
//!
//! Interleaves operations and checks the context's bookkeeping against a
//! simple model.

use arbitrary::Arbitrary;
use injector_bundle::{ApplicationContext, BeanDefinition, DiError};
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

#[derive(Debug, Arbitrary)]
enum ContextOp {
    Singleton { name: u8, value: u32 },
    Lazy { name: u8, dependency: Option<u8> },
    Prototype { name: u8 },
    Get { name: u8 },
    GetWrongType { name: u8 },
    Refresh,
    Stop,
}

fn bean_name(byte: u8) -> String {
    format!("bean{}", byte % 8)
}

fuzz_target!(|ops: Vec<ContextOp>| {
    let context = ApplicationContext::new();
    let mut registered = HashSet::new();

    for op in ops {
        match op {
            ContextOp::Singleton { name, value } => {
                let name = bean_name(name);
                let result = context.register_singleton(name.clone(), value);
                check_registration(&context, &mut registered, name, result);
            }
            ContextOp::Lazy { name, dependency } => {
                let name = bean_name(name);
                let dependency = dependency.map(bean_name);
                let result = context.register(BeanDefinition::lazy(name.clone(), move |ctx| {
                    match &dependency {
                        Some(dep) => ctx.get::<u32>(dep).map(|v| v.wrapping_add(1)),
                        None => Ok(0u32),
                    }
                }));
                check_registration(&context, &mut registered, name, result);
            }
            ContextOp::Prototype { name } => {
                let name = bean_name(name);
                let result = context.register(BeanDefinition::prototype(name.clone(), |_| Ok(7u32)));
                check_registration(&context, &mut registered, name, result);
            }
            ContextOp::Get { name } => {
                let name = bean_name(name);
                match context.get::<u32>(&name) {
                    Ok(_) => assert!(registered.contains(&name)),
                    Err(DiError::NotFound { name: missing }) if missing == name => {
                        assert!(!registered.contains(&name))
                    }
                    Err(_) => assert!(registered.contains(&name)),
                }
            }
            ContextOp::GetWrongType { name } => {
                assert!(context.get::<String>(&bean_name(name)).is_err());
            }
            ContextOp::Refresh => {
                let was_active = context.is_active();
                match context.refresh() {
                    Ok(()) => assert!(!was_active && context.is_active()),
                    Err(DiError::AlreadyActive) => assert!(was_active),
                    Err(_) => assert!(!context.is_active()),
                }
            }
            ContextOp::Stop => {
                context.stop();
                assert!(!context.is_running());
            }
        }

        assert_eq!(context.len(), registered.len());
    }
});

fn check_registration(
    context: &ApplicationContext,
    registered: &mut HashSet<String>,
    name: String,
    result: injector_bundle::Result<()>,
) {
    match result {
        Ok(()) => assert!(registered.insert(name)),
        Err(DiError::AlreadyRegistered { .. }) => assert!(registered.contains(&name)),
        Err(DiError::Locked) => assert!(context.is_active()),
        Err(other) => panic!("unexpected registration error: {other}"),
    }
}
