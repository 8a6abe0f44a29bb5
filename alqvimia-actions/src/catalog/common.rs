use crate::field::FieldDescriptor as F;

/// Execution-policy fields rendered under every action panel.
pub fn common_fields() -> Vec<F> {
    vec![
        F::number("timeout", "Timeout")
            .default_value(30)
            .range(1.0, 3600.0)
            .unit("s"),
        F::number("retryCount", "Retries")
            .default_value(3)
            .range(0.0, 10.0),
        F::number("retryDelay", "Delay between retries")
            .default_value(1000)
            .range(0.0, 60000.0)
            .unit("ms"),
        F::toggle("continueOnError", "Continue on error").default_value(false),
        F::number("waitBefore", "Wait before")
            .default_value(0)
            .range(0.0, 60000.0)
            .unit("ms")
            .advanced(),
        F::number("waitAfter", "Wait after")
            .default_value(500)
            .range(0.0, 60000.0)
            .unit("ms")
            .advanced(),
        F::toggle("screenshotOnError", "Screenshot on error")
            .default_value(false)
            .advanced(),
    ]
}
