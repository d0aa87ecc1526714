//! NSI script template.
//!
//! Rendered with handlebars (no HTML escaping). Values are pre-escaped with
//! [`super::utils::escape_nsis`] before rendering. Paths that follow a
//! backslash are rendered whole, since `\{{` is a handlebars escape.

/// Installer script: metadata, install section, optional shortcuts and a
/// mirrored uninstall section.
pub const NSI_TEMPLATE: &str = r#"; Generated installer script for {{app_name}} {{version}}
Unicode true
SetCompressor /SOLID lzma

!define APP_NAME "{{app_name}}"
!define COMPANY_NAME "{{company_name}}"
!define VERSION "{{version}}"
!define UNINSTALL_KEY "{{uninstall_key}}"

Name "${APP_NAME}"
OutFile "{{output_file}}"
InstallDir "{{install_dir}}"
RequestExecutionLevel admin

VIProductVersion "{{version_nsis}}"
VIAddVersionKey "ProductName" "${APP_NAME}"
VIAddVersionKey "CompanyName" "${COMPANY_NAME}"
VIAddVersionKey "FileDescription" "${APP_NAME} Setup"
VIAddVersionKey "FileVersion" "${VERSION}"
VIAddVersionKey "ProductVersion" "${VERSION}"
VIAddVersionKey "LegalCopyright" "{{copyright}}"

Page directory
Page instfiles
UninstPage uninstConfirm
UninstPage instfiles

Section "Install"
  SetOutPath "$INSTDIR"
  File /r "{{source_glob}}"

  WriteRegStr HKLM "${UNINSTALL_KEY}" "DisplayName" "${APP_NAME}"
  WriteRegStr HKLM "${UNINSTALL_KEY}" "DisplayVersion" "${VERSION}"
  WriteRegStr HKLM "${UNINSTALL_KEY}" "Publisher" "${COMPANY_NAME}"
  WriteRegStr HKLM "${UNINSTALL_KEY}" "InstallLocation" "$INSTDIR"
  WriteRegStr HKLM "${UNINSTALL_KEY}" "DisplayIcon" "{{main_exe}}"
  WriteRegStr HKLM "${UNINSTALL_KEY}" "UninstallString" "$\"$INSTDIR\uninstall.exe$\""
  WriteRegDWORD HKLM "${UNINSTALL_KEY}" "NoModify" 1
  WriteRegDWORD HKLM "${UNINSTALL_KEY}" "NoRepair" 1
  WriteUninstaller "$INSTDIR\uninstall.exe"
{{#if desktop_shortcut}}
  CreateShortcut "$DESKTOP\${APP_NAME}.lnk" "{{main_exe}}"
{{/if}}
{{#if start_menu_shortcut}}
  CreateDirectory "$SMPROGRAMS\${APP_NAME}"
  CreateShortcut "$SMPROGRAMS\${APP_NAME}\${APP_NAME}.lnk" "{{main_exe}}"
  CreateShortcut "$SMPROGRAMS\${APP_NAME}\Uninstall ${APP_NAME}.lnk" "$INSTDIR\uninstall.exe"
{{/if}}
SectionEnd

Section "Uninstall"
{{#if desktop_shortcut}}
  Delete "$DESKTOP\${APP_NAME}.lnk"
{{/if}}
{{#if start_menu_shortcut}}
  Delete "$SMPROGRAMS\${APP_NAME}\${APP_NAME}.lnk"
  Delete "$SMPROGRAMS\${APP_NAME}\Uninstall ${APP_NAME}.lnk"
  RMDir "$SMPROGRAMS\${APP_NAME}"
{{/if}}
  Delete "$INSTDIR\uninstall.exe"
  RMDir /r "$INSTDIR"
  DeleteRegKey HKLM "${UNINSTALL_KEY}"
SectionEnd
"#;
