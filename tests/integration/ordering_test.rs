//! Properties of rule and hook ordering.

use std::sync::Arc;

use proptest::prelude::*;

use proxybuilder::test_utils::{EchoService, Service, ServiceFailure};
use proxybuilder::InvocationError;

use crate::common::{logged_builder, CallLog};

fn labels(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}-{}", prefix, i)).collect()
}

proptest! {
    #[test]
    fn prop_first_denial_stops_pipeline(
        decisions in prop::collection::vec(any::<bool>(), 0..8),
        pre in 0usize..4,
        post in 0usize..4,
    ) {
        let echo = Arc::new(EchoService::new());
        let log = CallLog::new();
        let proxy = logged_builder(echo.clone(), &log, &decisions, pre, post)
            .build()
            .unwrap();

        let result = proxy.invoke("doWork", &["x".into()]);

        match decisions.iter().position(|allow| !allow) {
            Some(denied) => {
                let err = result.unwrap_err();
                prop_assert_eq!(err.denied_by(), Some(denied));
                prop_assert_eq!(log.entries(), labels("rule", denied + 1));
                prop_assert_eq!(echo.calls(), 0);
            }
            None => {
                let value = result.unwrap();
                prop_assert_eq!(value.as_str().unwrap(), "x");
                let mut expected = labels("rule", decisions.len());
                expected.extend(labels("pre", pre));
                expected.extend(labels("post", post));
                prop_assert_eq!(log.entries(), expected);
                prop_assert_eq!(echo.calls(), 1);
            }
        }
    }

    #[test]
    fn prop_failing_pre_action_stops_later_hooks(pre in 1usize..6, failing in 0usize..6) {
        let failing = failing % pre;
        let echo = Arc::new(EchoService::new());
        let log = CallLog::new();
        let mut builder = logged_builder(echo.clone(), &log, &[true], 0, 0);
        for i in 0..pre {
            let label = format!("pre-{}", i);
            builder = if i == failing {
                builder.add_pre_action(log.failing_hook::<dyn Service>(&label))
            } else {
                builder.add_pre_action(log.hook::<dyn Service>(&label))
            };
        }
        let proxy = builder
            .add_post_action(log.hook::<dyn Service>("post-0"))
            .build()
            .unwrap();

        let err = proxy.invoke("doWork", &["x".into()]).unwrap_err();
        let is_pre_failure = matches!(&err, InvocationError::PreAction { index, .. } if *index == failing);
        prop_assert!(is_pre_failure);
        prop_assert!(err.into_source().downcast_ref::<ServiceFailure>().is_some());

        let mut expected = labels("rule", 1);
        expected.extend(labels("pre", failing + 1));
        prop_assert_eq!(log.entries(), expected);
        prop_assert_eq!(echo.calls(), 0);
    }
}
