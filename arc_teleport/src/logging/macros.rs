/// Emit a `tracing` event only when the scope's configured level allows it.
///
/// `scoped_log!(debug, "navmesh", "culled {} triangles", n)`
#[macro_export]
macro_rules! scoped_log {
    (@emit $mac:ident, $level:ident, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::get_log_config().should_log($scope, $crate::logging::Level::$level) {
            ::tracing::$mac!(scope = $scope, $($arg)*);
        }
    };
    (error, $scope:expr, $($arg:tt)*) => {
        $crate::scoped_log!(@emit error, ERROR, $scope, $($arg)*)
    };
    (warn, $scope:expr, $($arg:tt)*) => {
        $crate::scoped_log!(@emit warn, WARN, $scope, $($arg)*)
    };
    (info, $scope:expr, $($arg:tt)*) => {
        $crate::scoped_log!(@emit info, INFO, $scope, $($arg)*)
    };
    (debug, $scope:expr, $($arg:tt)*) => {
        $crate::scoped_log!(@emit debug, DEBUG, $scope, $($arg)*)
    };
    (trace, $scope:expr, $($arg:tt)*) => {
        $crate::scoped_log!(@emit trace, TRACE, $scope, $($arg)*)
    };
}

#[macro_export]
macro_rules! navmesh_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "navmesh", $($arg)*)
    };
}

#[macro_export]
macro_rules! teleport_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "teleport", $($arg)*)
    };
}

#[macro_export]
macro_rules! physics_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "physics", $($arg)*)
    };
}
