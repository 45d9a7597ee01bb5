//! The workspace every widget is compiled in.
//!
//! ```text
//! /src
//! ├── components/        readonly
//! │   └── ui/            host-provided primitives (externalized)
//! ├── widget/
//! │   ├── index.tsx      the widget component
//! │   └── query.sql.ts   its data query
//! └── lib/               readonly
//!     └── utils.ts       runSql / cn (externalized)
//! ```

use qyp_vfs::{NodeMetadata, VfsResult, VirtualFs};

pub const DEFAULT_ENTRY_POINT: &str = "/src/widget/index.tsx";
pub const WIDGET_QUERY_PATH: &str = "/src/widget/query.sql.ts";

/// UI primitives the host registers under `@/components/ui/<name>`.
pub const UI_PRIMITIVES: [&str; 5] = ["button", "card", "input", "badge", "table"];

/// Class names used by the host-rendered primitives. Their sources are
/// externalized, so the stylesheet would never see these otherwise.
pub const UI_SAFELIST: &[&str] = &[
    "inline-flex",
    "items-center",
    "justify-center",
    "rounded-md",
    "rounded-lg",
    "rounded-full",
    "px-2",
    "px-3",
    "px-4",
    "py-0.5",
    "py-1",
    "py-2",
    "p-4",
    "text-xs",
    "text-sm",
    "text-lg",
    "font-medium",
    "font-semibold",
    "bg-white",
    "bg-gray-100",
    "bg-gray-900",
    "text-white",
    "text-gray-900",
    "text-gray-500",
    "hover:bg-gray-800",
    "hover:bg-gray-50",
    "border",
    "border-b",
    "border-gray-200",
    "shadow-sm",
    "w-full",
    "text-left",
    "transition",
    "cursor-pointer",
    "dark:bg-gray-900",
    "dark:bg-white",
    "dark:text-white",
    "dark:text-gray-900",
    "dark:border-gray-700",
];

pub const DEFAULT_WIDGET_SOURCE: &str = r#"import { useState, useEffect, useCallback } from 'react';
import { Button } from '@/components/ui/button';
import fetchCustomersCount from '@/widget/query.sql';

export default function MyComponent() {
	const [customersCount, setCustomersCount] = useState(0);
	const [loading, setLoading] = useState(false);

	const reloadCustomersCount = useCallback(async () => {
		setLoading(true);
		const rows = await fetchCustomersCount();
		setCustomersCount(rows.length > 0 ? rows[0].count : -1);
		setLoading(false);
	}, []);

	useEffect(() => {
		reloadCustomersCount();
	}, [reloadCustomersCount]);

	return (
		<div className="w-full h-full p-4 bg-blue-100 dark:bg-blue-900 rounded-lg">
			<h2 className="text-lg font-bold text-blue-800 dark:text-blue-200">Customers Count</h2>
			<p className="text-blue-600 dark:text-blue-300 py-2 text-2xl">
				{loading ? 'Loading...' : customersCount}
			</p>
			<Button onClick={reloadCustomersCount}>Reload</Button>
		</div>
	);
}
"#;

pub const DEFAULT_QUERY_SOURCE: &str = r#"import { runSql } from '@/lib/utils';

/**
 * Fetch the number of customers.
 */
export default async function fetchCustomersCount() {
	return await runSql<{ count: number }[]>(`SELECT COUNT(*) as count FROM customer`);
}
"#;

const UTILS_STUB: &str = "// provided by the host: runSql(query), cn(...classes)\n";

fn ui_stub(name: &str) -> String {
    format!("// provided by the host: @/components/ui/{name}\n")
}

/// Build the widget workspace around the given widget and query sources.
pub fn build_default_fs(widget_source: &str, query_source: &str) -> VfsResult<VirtualFs> {
    let mut vfs = VirtualFs::new();
    vfs.make_directory("/src", None)?;

    vfs.make_directory("/src/components", Some(NodeMetadata::readonly()))?;
    vfs.make_directory("/src/components/ui", None)?;
    for name in UI_PRIMITIVES {
        vfs.write_file(
            &format!("/src/components/ui/{name}.tsx"),
            ui_stub(name),
            Some(NodeMetadata::externalized()),
        )?;
    }

    vfs.make_directory("/src/widget", None)?;
    vfs.write_file(DEFAULT_ENTRY_POINT, widget_source, None)?;
    vfs.write_file(WIDGET_QUERY_PATH, query_source, None)?;

    vfs.make_directory("/src/lib", Some(NodeMetadata::readonly()))?;
    vfs.write_file(
        "/src/lib/utils.ts",
        UTILS_STUB,
        Some(NodeMetadata::externalized()),
    )?;

    Ok(vfs)
}
